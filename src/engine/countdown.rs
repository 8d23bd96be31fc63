use chrono::{Duration, NaiveDateTime, NaiveTime};

/// Time left until the next local midnight, when a new puzzle unlocks.
pub fn time_until_next_day(now: NaiveDateTime) -> Duration {
    match now.date().succ_opt() {
        Some(tomorrow) => tomorrow.and_time(NaiveTime::MIN) - now,
        None => Duration::zero(),
    }
}

/// `HH:MM:SS`, hours wrapped at a day.
pub fn format_hms(remaining: Duration) -> String {
    let secs = remaining.num_seconds().max(0);
    let hours = (secs / 3600) % 24;
    let minutes = (secs / 60) % 60;
    let seconds = secs % 60;
    format!("{hours:02}:{minutes:02}:{seconds:02}")
}

/// Display-only countdown shown on result screens. Recomputed at most once
/// per second while armed.
#[derive(Clone, Debug, Default)]
pub struct Countdown {
    text: Option<String>,
    last_refresh: Option<NaiveDateTime>,
}

impl Countdown {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_armed(&self) -> bool {
        self.last_refresh.is_some()
    }

    pub fn text(&self) -> Option<&str> {
        self.text.as_deref()
    }

    pub fn arm(&mut self, now: NaiveDateTime) {
        self.refresh(now);
    }

    /// Returns true if the display text was recomputed.
    pub fn tick(&mut self, now: NaiveDateTime) -> bool {
        match self.last_refresh {
            Some(last) if now - last >= Duration::seconds(1) => {
                self.refresh(now);
                true
            }
            _ => false,
        }
    }

    pub fn clear(&mut self) {
        self.text = None;
        self.last_refresh = None;
    }

    fn refresh(&mut self, now: NaiveDateTime) {
        self.text = Some(format_hms(time_until_next_day(now)));
        self.last_refresh = Some(now);
    }
}
