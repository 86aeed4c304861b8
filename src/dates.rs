use chrono::{Duration, Local, NaiveDate, NaiveTime};

/// Number of selectable days, today included.
pub const WINDOW_DAYS: usize = 7;

/// The only place the crate reads the wall clock for calendar purposes.
pub fn local_today() -> NaiveDate {
    Local::now().date_naive()
}

/// The rolling set of days a task may be scheduled on: `today ..= today + 6`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DateWindow {
    days: [NaiveDate; WINDOW_DAYS],
}

impl DateWindow {
    /// Builds the window starting at `today`.
    ///
    /// Offsets are applied to noon of `today` rather than midnight so that a
    /// daylight-saving or UTC boundary can never move the result onto the
    /// neighbouring calendar day.
    pub fn starting(today: NaiveDate) -> Self {
        let noon = today.and_time(NaiveTime::from_hms_opt(12, 0, 0).unwrap_or(NaiveTime::MIN));
        let mut days = [today; WINDOW_DAYS];
        for (offset, day) in days.iter_mut().enumerate() {
            *day = (noon + Duration::days(offset as i64)).date();
        }
        DateWindow { days }
    }

    pub fn today(&self) -> NaiveDate {
        self.days[0]
    }

    pub fn last(&self) -> NaiveDate {
        self.days[WINDOW_DAYS - 1]
    }

    pub fn dates(&self) -> &[NaiveDate] {
        &self.days
    }

    pub fn iter(&self) -> impl Iterator<Item = (NaiveDate, String)> + '_ {
        self.days.iter().enumerate().map(|(i, d)| (*d, label_for(i, *d)))
    }

    pub fn contains(&self, date: NaiveDate) -> bool {
        date >= self.today() && date <= self.last()
    }

    pub fn index_of(&self, date: NaiveDate) -> Option<usize> {
        self.days.iter().position(|d| *d == date)
    }

    pub fn get(&self, index: usize) -> Option<NaiveDate> {
        self.days.get(index).copied()
    }

    /// Tab label for the day at `index`; `None` past the end of the window.
    pub fn label(&self, index: usize) -> Option<String> {
        self.get(index).map(|d| label_for(index, d))
    }

    /// Label for an arbitrary date, falling back to the short form outside the window.
    pub fn label_of(&self, date: NaiveDate) -> String {
        match self.index_of(date) {
            Some(i) => label_for(i, date),
            None => short_label(date),
        }
    }
}

fn label_for(index: usize, date: NaiveDate) -> String {
    match index {
        0 => "Today".to_string(),
        1 => "Tomorrow".to_string(),
        _ => short_label(date),
    }
}

/// e.g. `Thu, Jan 4`
pub fn short_label(date: NaiveDate) -> String {
    date.format("%a, %b %-d").to_string()
}
