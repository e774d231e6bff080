// Oracle date/time functions rewritten for SQL Server.
// Pure text substitution over a statement fragment; never fails.

use chrono::{NaiveDate, NaiveDateTime, NaiveTime};
use regex::{Captures, Regex};

const MONTHS: [&str; 12] = [
    "JAN", "FEB", "MAR", "APR", "MAY", "JUN", "JUL", "AUG", "SEP", "OCT", "NOV", "DEC",
];

pub struct FunctionTranslator {
    to_timestamp_re: Regex,
    to_date_re: Regex,
    current_time_re: Regex,
}

impl FunctionTranslator {
    pub fn new() -> Self {
        let to_timestamp_re = Regex::new(r"(?i)to_timestamp\('([^']+)'\s*,([^)]+)\)")
            .expect("valid to_timestamp regex");
        let to_date_re =
            Regex::new(r"(?i)to_date\(([^,]+),([^)]+)\)").expect("valid to_date regex");
        let current_time_re =
            Regex::new(r"(?i)\bsys(?:date|timestamp)\b").expect("valid sysdate regex");
        Self {
            to_timestamp_re,
            to_date_re,
            current_time_re,
        }
    }

    pub fn translate(&self, text: &str) -> String {
        let out = self
            .to_timestamp_re
            .replace_all(text, |caps: &Captures| timestamp_literal(&caps[1]));
        let out = self
            .to_date_re
            .replace_all(&out, |caps: &Captures| caps[1].trim().to_string());
        self.current_time_re
            .replace_all(&out, "GETDATE()")
            .into_owned()
    }
}

impl Default for FunctionTranslator {
    fn default() -> Self {
        Self::new()
    }
}

// '01-JAN-99 12.30.00.000000 PM' -> '1999-01-01 12:30:00.000'.
// Falls back to the input re-quoted when any part does not parse.
pub fn timestamp_literal(date_str: &str) -> String {
    let date_str = date_str.trim().trim_matches(['\'', '"'].as_ref());
    match parse_oracle_timestamp(date_str) {
        Some(ts) => format!("'{}'", ts.format("%Y-%m-%d %H:%M:%S.000")),
        None => format!("'{}'", date_str),
    }
}

fn parse_oracle_timestamp(date_str: &str) -> Option<NaiveDateTime> {
    let parts: Vec<&str> = date_str.split_whitespace().collect();
    let (date_part, time_part, meridiem) = match parts.as_slice() {
        [d, t] => (*d, *t, None),
        [d, t, m] => (*d, *t, Some(m.to_uppercase())),
        _ => return None,
    };

    let date_fields: Vec<&str> = date_part.split('-').collect();
    let [day, month, year] = date_fields.as_slice() else {
        return None;
    };
    let day: u32 = day.parse().ok()?;
    let month = month_number(month);
    let year = expand_year(year)?;

    let time_fields: Vec<&str> = time_part.split(['.', ':']).collect();
    if time_fields.len() < 2 {
        return None;
    }
    let mut hour: u32 = time_fields[0].parse().ok()?;
    let minute: u32 = time_fields[1].parse().ok()?;
    let second: u32 = match time_fields.get(2) {
        Some(s) => s.parse().ok()?,
        None => 0,
    };
    match meridiem.as_deref() {
        Some("PM") if hour < 12 => hour += 12,
        Some("AM") if hour == 12 => hour = 0,
        Some("AM") | Some("PM") | None => {}
        Some(_) => return None,
    }

    let date = NaiveDate::from_ymd_opt(year, month, day)?;
    let time = NaiveTime::from_hms_opt(hour, minute, second)?;
    Some(NaiveDateTime::new(date, time))
}

// Unknown abbreviations map to January.
fn month_number(month: &str) -> u32 {
    let upper = month.to_uppercase();
    if let Some(idx) = MONTHS.iter().position(|m| *m == upper) {
        return idx as u32 + 1;
    }
    match month.parse::<u32>() {
        Ok(n) if (1..=12).contains(&n) => n,
        _ => 1,
    }
}

// Two-digit years pivot at 50; longer years are taken as written.
fn expand_year(year: &str) -> Option<i32> {
    let value: i32 = year.parse().ok()?;
    if value < 0 {
        return None;
    }
    if year.len() > 2 {
        return Some(value);
    }
    Some(if value < 50 { 2000 + value } else { 1900 + value })
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn translate(text: &str) -> String {
        FunctionTranslator::new().translate(text)
    }

    #[test]
    fn to_timestamp_pivots_two_digit_years() {
        assert_eq!(
            translate("to_timestamp('01-JAN-99 12:30:00.0', 'DD-MON-YY')"),
            "'1999-01-01 12:30:00.000'"
        );
        assert_eq!(
            translate("to_timestamp('01-JAN-05 08.15.00.000000000','DD-MON-RR HH24.MI.SSXFF')"),
            "'2005-01-01 08:15:00.000'"
        );
        assert_eq!(
            translate("to_timestamp('17-MAR-49 01.02','DD-MON-RR HH24.MI')"),
            "'2049-03-17 01:02:00.000'"
        );
    }

    #[test]
    fn meridiem_is_honoured() {
        assert_eq!(
            timestamp_literal("05-DEC-10 03.04.05.000000 PM"),
            "'2010-12-05 15:04:05.000'"
        );
        assert_eq!(
            timestamp_literal("05-DEC-10 12.00.00.000000 AM"),
            "'2010-12-05 00:00:00.000'"
        );
    }

    #[test]
    fn unknown_month_defaults_to_january() {
        assert_eq!(
            timestamp_literal("09-XYZ-80 10:00:00"),
            "'1980-01-09 10:00:00.000'"
        );
    }

    #[test]
    fn unparseable_timestamp_falls_back_to_quoted_input() {
        assert_eq!(timestamp_literal("not a date"), "'not a date'");
        assert_eq!(timestamp_literal("32-JAN-99 10:00:00"), "'32-JAN-99 10:00:00'");
        assert_eq!(
            translate("x = to_timestamp('garbage','DD-MON-YY')"),
            "x = 'garbage'"
        );
    }

    #[test]
    fn to_date_keeps_first_argument() {
        assert_eq!(
            translate("to_date('2020-01-02','YYYY-MM-DD'),3"),
            "'2020-01-02',3"
        );
    }

    #[test]
    fn current_time_functions_any_case() {
        assert_eq!(translate("SYSDATE, systimestamp"), "GETDATE(), GETDATE()");
        assert_eq!(translate("SysDate_col"), "SysDate_col");
    }
}
