//! Input cleanup run before scanning.
//!
//! The grammar expects compact text with Arabic digits: no whitespace, no
//! possessive/topic particle 的, and Chinese numerals transliterated
//! (十五 -> 15, 一九九八 -> 1998, 星期三 -> 星期3). Every offset produced by
//! the pipeline refers to the cleaned text, never to the raw input.

use std::borrow::Cow;

/// Clean raw input text for scanning.
///
/// Idempotent, and never grows the byte length: each Chinese numeral is three
/// UTF-8 bytes, wider than any digit sequence it turns into.
pub fn clean(raw: &str) -> String {
    let stripped: String = raw.chars().filter(|c| !c.is_whitespace() && *c != '的').collect();
    translate_numerals(&stripped)
}

/// Transliterate Chinese numerals to Arabic digits.
///
/// Compound tens first (十 -> 10, 十五 -> 15, 二十 -> 20, 三十一 -> 31), then
/// the remaining single numerals digit-by-digit, which is what year sequences
/// like 一九九八 need.
fn translate_numerals(text: &str) -> String {
    let tens = regex!("([一二两三四五六七八九])?十([一二三四五六七八九])?");
    let text: Cow<'_, str> = tens.replace_all(text, |caps: &regex::Captures| {
        let tens_digit = caps.get(1).map_or(1, |m| digit_value(m.as_str()));
        let unit_digit = caps.get(2).map_or(0, |m| digit_value(m.as_str()));
        (tens_digit * 10 + unit_digit).to_string()
    });

    let singles = regex!("[零一二两三四五六七八九]");
    singles.replace_all(&text, |caps: &regex::Captures| digit_value(&caps[0]).to_string()).into_owned()
}

fn digit_value(numeral: &str) -> u32 {
    match numeral {
        "零" => 0,
        "一" => 1,
        "二" | "两" => 2,
        "三" => 3,
        "四" => 4,
        "五" => 5,
        "六" => 6,
        "七" => 7,
        "八" => 8,
        "九" => 9,
        _ => 0,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn numeral_examples() {
        // Array of (expected, input)
        let cases: Vec<(&str, &str)> = vec![
            ("10", "十"),
            ("15", "十五"),
            ("20", "二十"),
            ("23", "二十三"),
            ("31", "三十一"),
            ("2", "两"),
            ("1998", "一九九八"),
            ("1998年", "一九九八年"),
            ("星期3", "星期三"),
            ("第4季度", "第四季度"),
            ("周日", "周日"),
            ("3点25分", "三点二十五分"),
        ];

        for (expected, input) in cases {
            assert_eq!(clean(input), expected, "input: {input}");
        }
    }

    #[test]
    fn strips_whitespace_and_particle() {
        assert_eq!(clean("明天 下午 的 三点"), "明天下午3点");
        assert_eq!(clean("  去年\t第四季度\n至今 "), "去年第4季度至今");
    }

    #[test]
    fn idempotent() {
        let inputs = ["明天 下午 的 三点", "一九九八年十二月", "二十三日", "已经干净的文本2024年"];
        for input in inputs {
            let once = clean(input);
            assert_eq!(clean(&once), once, "input: {input}");
        }
    }

    #[test]
    fn never_grows_byte_length() {
        let inputs = ["十", "零", "一九九八年", "二十三", "星期三", "明天 下午 的 三点"];
        for input in inputs {
            assert!(clean(input).len() <= input.len(), "input: {input}");
        }
    }
}
