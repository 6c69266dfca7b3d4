use chrono::{Days, Months, NaiveDate};

/// A date input that can only ever hold a valid calendar date.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DatePicker {
    date: NaiveDate,
}

impl DatePicker {
    pub fn new(date: NaiveDate) -> Self {
        Self { date }
    }

    pub fn date(&self) -> NaiveDate {
        self.date
    }

    pub fn set(&mut self, date: NaiveDate) {
        self.date = date;
    }

    pub fn next_day(&mut self) {
        if let Some(d) = self.date.checked_add_days(Days::new(1)) {
            self.date = d;
        }
    }

    pub fn prev_day(&mut self) {
        if let Some(d) = self.date.checked_sub_days(Days::new(1)) {
            self.date = d;
        }
    }

    // Month steps clamp to the last day of a shorter month.
    pub fn next_month(&mut self) {
        if let Some(d) = self.date.checked_add_months(Months::new(1)) {
            self.date = d;
        }
    }

    pub fn prev_month(&mut self) {
        if let Some(d) = self.date.checked_sub_months(Months::new(1)) {
            self.date = d;
        }
    }

    pub fn label(&self) -> String {
        self.date.format("%Y-%m-%d (%a)").to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn d(y: i32, m: u32, day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, day).unwrap()
    }

    #[test]
    fn steps_across_month_and_year_boundaries() {
        let mut p = DatePicker::new(d(2023, 12, 31));
        p.next_day();
        assert_eq!(p.date(), d(2024, 1, 1));
        p.prev_day();
        assert_eq!(p.date(), d(2023, 12, 31));
    }

    #[test]
    fn month_steps_clamp_to_month_end() {
        let mut p = DatePicker::new(d(2024, 1, 31));
        p.next_month();
        assert_eq!(p.date(), d(2024, 2, 29));
        p.prev_month();
        assert_eq!(p.date(), d(2024, 1, 29));
    }

    #[test]
    fn label_shows_weekday() {
        assert_eq!(DatePicker::new(d(2024, 1, 2)).label(), "2024-01-02 (Tue)");
    }
}
