// Export components
pub mod google_calendar;

// Re-export Google Calendar handle
pub use google_calendar::GoogleCalendarHandle;
