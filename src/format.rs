// Display helpers for amounts and dates, en-IN conventions

use chrono::NaiveDate;

const RUPEE: char = '₹';

/// `150000` -> `₹1,50,000`. Lakh/crore grouping, whole rupees.
pub fn format_currency(amount: i64) -> String {
    let sign = if amount < 0 { "-" } else { "" };
    format!("{}{}{}", sign, RUPEE, group_indian(amount.unsigned_abs()))
}

/// `150000` -> `₹1.5L`, `15000` -> `₹15K`, `800` -> `₹800`.
///
/// Negative amounts are not abbreviated: `-20000` -> `₹-20000`.
pub fn format_short_currency(amount: i64) -> String {
    let body = if amount >= 100_000 {
        // tenths of a lakh, rounded half up
        let tenths = (amount.unsigned_abs() + 5_000) / 10_000;
        format!("{}.{}L", tenths / 10, tenths % 10)
    } else if amount >= 1_000 {
        format!("{}K", (amount + 500) / 1_000)
    } else {
        amount.to_string()
    };

    format!("{}{}", RUPEE, body)
}

/// `2024-05-05` -> `5 May 2024`.
pub fn format_date(day: NaiveDate) -> String {
    day.format("%-d %b %Y").to_string()
}

fn group_indian(value: u64) -> String {
    let digits = value.to_string();
    if digits.len() <= 3 {
        return digits;
    }

    let (head, tail) = digits.split_at(digits.len() - 3);
    let mut groups: Vec<&str> = Vec::new();
    let mut end = head.len();
    while end > 0 {
        let start = end.saturating_sub(2);
        groups.push(&head[start..end]);
        end = start;
    }
    groups.reverse();

    format!("{},{}", groups.join(","), tail)
}
