//! Turns raw answer text into an integer. Speech transcripts arrive as free
//! text ("twenty one", "it's 12"), so parsing is a seam: the session takes
//! any `AnswerParser`, and the default understands digits and spelled-out
//! English numerals. When a transcript contains several numbers the last one
//! wins, since transcripts accrete as the recognizer refines its guess.

pub trait AnswerParser {
    /// Extract an integer from raw text, or `None` if there is none.
    fn parse(&self, raw: &str) -> Option<i32>;
}

#[derive(Debug, Clone, Copy, Default)]
pub struct EnglishAnswerParser;

/// A contiguous run of number words being accumulated, e.g.
/// "negative one hundred twenty one".
#[derive(Debug, Default)]
struct NumberRun {
    negative: bool,
    total: i64,
    current: i64,
    has_digits: bool,
}

impl NumberRun {
    /// Try to fold one word into the run. Returns false if the word is not
    /// part of a number, which ends the run.
    fn push_word(&mut self, word: &str) -> bool {
        let unit = match word {
            "zero" => Some(0),
            "one" => Some(1),
            "two" => Some(2),
            "three" => Some(3),
            "four" => Some(4),
            "five" => Some(5),
            "six" => Some(6),
            "seven" => Some(7),
            "eight" => Some(8),
            "nine" => Some(9),
            "ten" => Some(10),
            "eleven" => Some(11),
            "twelve" => Some(12),
            "thirteen" => Some(13),
            "fourteen" => Some(14),
            "fifteen" => Some(15),
            "sixteen" => Some(16),
            "seventeen" => Some(17),
            "eighteen" => Some(18),
            "nineteen" => Some(19),
            "twenty" => Some(20),
            "thirty" => Some(30),
            "forty" => Some(40),
            "fifty" => Some(50),
            "sixty" => Some(60),
            "seventy" => Some(70),
            "eighty" => Some(80),
            "ninety" => Some(90),
            _ => None,
        };
        if let Some(n) = unit {
            self.current += n;
            self.has_digits = true;
            return true;
        }
        match word {
            "negative" | "minus" if !self.has_digits => {
                self.negative = true;
                true
            }
            "hundred" if self.has_digits => {
                self.current = self.current.max(1) * 100;
                true
            }
            "thousand" if self.has_digits => {
                self.total += self.current.max(1) * 1000;
                self.current = 0;
                true
            }
            // "one hundred and five"
            "and" if self.has_digits => true,
            _ => false,
        }
    }

    fn value(&self) -> Option<i32> {
        if !self.has_digits {
            return None;
        }
        let v = self.total + self.current;
        let v = if self.negative { -v } else { v };
        i32::try_from(v).ok()
    }
}

impl AnswerParser for EnglishAnswerParser {
    fn parse(&self, raw: &str) -> Option<i32> {
        let normalized = raw.to_lowercase().replace('−', "-");
        let mut last: Option<i32> = None;
        let mut run = NumberRun::default();

        for token in normalized.split_whitespace() {
            let token = token.trim_matches(|c: char| !c.is_alphanumeric() && c != '-');
            if token.is_empty() {
                continue;
            }

            if let Ok(mut v) = token.parse::<i32>() {
                // "negative 5": a pending sign word applies to the digits
                if run.negative && !run.has_digits && v > 0 {
                    v = -v;
                }
                last = Some(v);
                run = NumberRun::default();
                continue;
            }

            let mut broke = false;
            for word in token.split('-') {
                if word.is_empty() {
                    continue;
                }
                if !run.push_word(word) {
                    broke = true;
                }
            }
            if broke {
                last = run.value().or(last);
                run = NumberRun::default();
            }
        }

        run.value().or(last)
    }
}
