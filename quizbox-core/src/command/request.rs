//! HTTP request-line parsing
//!
//! Only the request line matters: every endpoint is a GET with its
//! parameters in the query string, so headers and bodies are ignored.

use heapless::String;

use super::{Command, QueryText, QuizUpdate, RequestError, QUERY_TEXT_LEN};

/// Parse the head of an HTTP request into a command
///
/// `head` holds at least the request line; anything after the first line
/// break is ignored.
pub fn parse_request(head: &[u8]) -> Result<Command, RequestError> {
    let line_end = head
        .iter()
        .position(|&b| b == b'\r' || b == b'\n')
        .unwrap_or(head.len());
    let line = core::str::from_utf8(&head[..line_end]).map_err(|_| RequestError::Malformed)?;

    let mut parts = line.split(' ');
    let (method, target, version) = match (parts.next(), parts.next(), parts.next(), parts.next())
    {
        (Some(m), Some(t), Some(v), None) => (m, t, v),
        _ => return Err(RequestError::Malformed),
    };
    if method.is_empty() || !target.starts_with('/') || !version.starts_with("HTTP/") {
        return Err(RequestError::Malformed);
    }

    let (path, query) = target.split_once('?').unwrap_or((target, ""));
    let route = Route::from_path(path).ok_or(RequestError::NotFound)?;
    if method != "GET" {
        return Err(RequestError::MethodNotAllowed);
    }

    Ok(match route {
        Route::Status => Command::Status,
        Route::Step => Command::LegacyStep,
        Route::Move => Command::Move {
            steps: parse_steps(query)?,
        },
        Route::Quiz => Command::SetQuiz(QuizUpdate {
            question: query_param(query, "q").map(decode),
            answer1: query_param(query, "a1").map(decode),
            answer2: query_param(query, "a2").map(decode),
        }),
        Route::PollVotes => Command::PollVotes,
    })
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Route {
    Status,
    Step,
    Move,
    Quiz,
    PollVotes,
}

impl Route {
    fn from_path(path: &str) -> Option<Self> {
        match path {
            "/" => Some(Route::Status),
            "/step" => Some(Route::Step),
            "/move" => Some(Route::Move),
            "/quiz" => Some(Route::Quiz),
            "/poll_votes" => Some(Route::PollVotes),
            _ => None,
        }
    }
}

/// Find the raw (still encoded) value of the first `key=` pair
fn query_param<'a>(query: &'a str, key: &str) -> Option<&'a str> {
    query
        .split('&')
        .filter_map(|pair| match pair.split_once('=') {
            Some((k, v)) => Some((k, v)),
            None if !pair.is_empty() => Some((pair, "")),
            None => None,
        })
        .find(|(k, _)| *k == key)
        .map(|(_, v)| v)
}

/// Parse the `steps` parameter of `/move`
///
/// Values beyond `i32` saturate so they are reported against the move
/// limit instead of as garbage.
fn parse_steps(query: &str) -> Result<i32, RequestError> {
    let raw = query_param(query, "steps").ok_or(RequestError::MissingSteps)?;
    let text = decode(raw);
    let text = text.trim();
    if text.is_empty() {
        return Err(RequestError::MissingSteps);
    }
    let (negative, digits) = match text.as_bytes() {
        [b'-', rest @ ..] => (true, rest),
        [b'+', rest @ ..] => (false, rest),
        rest => (false, rest),
    };
    if digits.is_empty() || !digits.iter().all(u8::is_ascii_digit) {
        return Err(RequestError::InvalidSteps);
    }
    let magnitude = digits.iter().fold(0i64, |acc, d| {
        acc.saturating_mul(10).saturating_add(i64::from(d - b'0'))
    });
    let steps = if negative { -magnitude } else { magnitude };
    Ok(steps.clamp(i64::from(i32::MIN), i64::from(i32::MAX)) as i32)
}

/// Percent-decode a query value, treating `+` as a space
///
/// Malformed escapes are kept literally. Invalid UTF-8 sequences become
/// `?`. Output longer than the buffer is cut at a character boundary.
pub fn decode(raw: &str) -> QueryText {
    let mut bytes: heapless::Vec<u8, { QUERY_TEXT_LEN + 4 }> = heapless::Vec::new();
    let src = raw.as_bytes();
    let mut i = 0;
    while i < src.len() && !bytes.is_full() {
        let b = match src[i] {
            b'+' => b' ',
            b'%' => match (hex_value(src.get(i + 1)), hex_value(src.get(i + 2))) {
                (Some(hi), Some(lo)) => {
                    i += 2;
                    hi << 4 | lo
                }
                _ => b'%',
            },
            b => b,
        };
        let _ = bytes.push(b);
        i += 1;
    }
    let truncated = i < src.len();

    let mut out = String::new();
    let mut rest = &bytes[..];
    loop {
        match core::str::from_utf8(rest) {
            Ok(valid) => {
                push_truncated(&mut out, valid);
                break;
            }
            Err(e) => {
                let (valid, after) = rest.split_at(e.valid_up_to());
                if !push_truncated(&mut out, core::str::from_utf8(valid).unwrap_or("")) {
                    break;
                }
                match e.error_len() {
                    Some(len) => {
                        if out.push('?').is_err() {
                            break;
                        }
                        rest = &after[len..];
                    }
                    // Sequence cut off at the end of the input
                    None => {
                        if !truncated {
                            let _ = out.push('?');
                        }
                        break;
                    }
                }
            }
        }
    }
    out
}

fn hex_value(b: Option<&u8>) -> Option<u8> {
    match *b? {
        c @ b'0'..=b'9' => Some(c - b'0'),
        c @ b'a'..=b'f' => Some(c - b'a' + 10),
        c @ b'A'..=b'F' => Some(c - b'A' + 10),
        _ => None,
    }
}

/// Append whole characters while they fit; `false` once one did not
fn push_truncated(out: &mut QueryText, text: &str) -> bool {
    text.chars().all(|c| out.push(c).is_ok())
}
