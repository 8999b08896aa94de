//! Value transforms applied to raw card fields

use crate::constants::BUDDHIST_ERA_OFFSET;

const MONTHS_TH: [&str; 12] = [
    "ม.ค.", "ก.พ.", "มี.ค.", "เม.ย.", "พ.ค.", "มิ.ย.", "ก.ค.", "ส.ค.", "ก.ย.", "ต.ค.", "พ.ย.", "ธ.ค.",
];

const MONTHS_EN: [&str; 12] = [
    "Jan", "Feb", "Mar", "Apr", "May", "Jun", "Jul", "Aug", "Sep", "Oct", "Nov", "Dec",
];

/// Split a `YYYYMMDD` string into its year, month and day parts
fn split_date(raw: &str) -> Option<(&str, &str, &str)> {
    if raw.len() != 8 || !raw.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    Some((&raw[0..4], &raw[4..6], &raw[6..8]))
}

fn month_name<'a>(month: &'a str, table: &[&'static str; 12]) -> &'a str {
    match month.parse::<usize>() {
        Ok(m @ 1..=12) => table[m - 1],
        _ => month,
    }
}

/// Render a Buddhist Era `YYYYMMDD` date as `DD <Thai month> YYYY`
///
/// Anything that is not exactly eight digits is returned unchanged.
pub fn format_date_th(raw: &str) -> String {
    match split_date(raw) {
        Some((year, month, day)) => format!("{day} {} {year}", month_name(month, &MONTHS_TH)),
        None => raw.to_string(),
    }
}

/// Render a Buddhist Era `YYYYMMDD` date as a Gregorian `DD Mon YYYY`
pub fn format_date_en(raw: &str) -> String {
    let Some((year, month, day)) = split_date(raw) else {
        return raw.to_string();
    };
    let Ok(year) = year.parse::<i32>() else {
        return raw.to_string();
    };
    format!(
        "{day} {} {}",
        month_name(month, &MONTHS_EN),
        year - BUDDHIST_ERA_OFFSET
    )
}

/// Map the card's gender code to its Thai word
pub fn format_gender(code: &str) -> String {
    match code {
        "1" => "ชาย".to_string(),
        "2" => "หญิง".to_string(),
        other => other.to_string(),
    }
}

/// Replace `#` padding with spaces and trim
pub fn clean_text(raw: &str) -> String {
    raw.replace('#', " ").trim().to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_date_th() {
        assert_eq!(format_date_th("25300115"), "15 ม.ค. 2530");
        assert_eq!(format_date_th("25671231"), "31 ธ.ค. 2567");
        assert_eq!(format_date_th("25301315"), "15 13 2530");
        assert_eq!(format_date_th("2530011"), "2530011");
        assert_eq!(format_date_th("2530-1-1"), "2530-1-1");
    }

    #[test]
    fn test_format_date_en() {
        assert_eq!(format_date_en("25300115"), "15 Jan 1987");
        assert_eq!(format_date_en("25670229"), "29 Feb 2024");
        assert_eq!(format_date_en("25300015"), "15 00 1987");
        assert_eq!(format_date_en("abc"), "abc");
    }

    #[test]
    fn test_gregorian_year_is_buddhist_minus_543() {
        for year in [2480, 2500, 2530, 2567, 2599] {
            let raw = format!("{year}0601");
            let th = format_date_th(&raw);
            let en = format_date_en(&raw);
            let th_year: i32 = th.rsplit(' ').next().unwrap().parse().unwrap();
            let en_year: i32 = en.rsplit(' ').next().unwrap().parse().unwrap();
            assert_eq!(en_year, th_year - 543);
        }
    }

    #[test]
    fn test_format_gender() {
        assert_eq!(format_gender("1"), "ชาย");
        assert_eq!(format_gender("2"), "หญิง");
        assert_eq!(format_gender("9"), "9");
        assert_eq!(format_gender(""), "");
    }

    #[test]
    fn test_clean_text() {
        assert_eq!(clean_text("นาย#สมชาย##ใจดี"), "นาย สมชาย  ใจดี");
        assert_eq!(clean_text("#Mr.#John##Doe#   "), "Mr. John  Doe");
    }
}
