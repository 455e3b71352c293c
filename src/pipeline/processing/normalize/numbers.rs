const ONES: [&str; 20] = [
    "zero", "one", "two", "three", "four", "five", "six", "seven", "eight", "nine", "ten",
    "eleven", "twelve", "thirteen", "fourteen", "fifteen", "sixteen", "seventeen", "eighteen",
    "nineteen",
];

const TENS: [&str; 10] = [
    "", "", "twenty", "thirty", "forty", "fifty", "sixty", "seventy", "eighty", "ninety",
];

const SCALES: [(u64, &str); 3] = [
    (1_000_000_000, "billion"),
    (1_000_000, "million"),
    (1_000, "thousand"),
];

/// Digit runs longer than this are left as-is
pub const MAX_DIGITS: usize = 12;

/// Spell out a pure-digit token as space-separated English words.
/// Returns `None` for anything that is not a short run of ASCII digits.
pub fn number_to_words(token: &str) -> Option<String> {
    if token.is_empty() || token.len() > MAX_DIGITS || !token.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    let value: u64 = token.parse().ok()?;
    let mut words = Vec::new();
    push_words(value, &mut words);
    Some(words.join(" "))
}

fn push_words(mut value: u64, words: &mut Vec<&'static str>) {
    if value == 0 {
        words.push(ONES[0]);
        return;
    }
    for (scale, name) in SCALES {
        if value >= scale {
            push_below_thousand(value / scale, words);
            words.push(name);
            value %= scale;
        }
    }
    if value > 0 {
        push_below_thousand(value, words);
    }
}

fn push_below_thousand(value: u64, words: &mut Vec<&'static str>) {
    // Billions can exceed 999 with twelve digits
    if value >= 1_000 {
        push_words(value, words);
        return;
    }
    let hundreds = value / 100;
    let rest = value % 100;
    if hundreds > 0 {
        words.push(ONES[hundreds as usize]);
        words.push("hundred");
    }
    if rest >= 20 {
        words.push(TENS[(rest / 10) as usize]);
        if rest % 10 > 0 {
            words.push(ONES[(rest % 10) as usize]);
        }
    } else if rest > 0 {
        words.push(ONES[rest as usize]);
    }
}
