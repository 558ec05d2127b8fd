//! HTTP response encoding

use core::fmt::{self, Write};

use heapless::String;

use crate::motion::MotionError;
use crate::voting::VoteCounts;

use super::RequestError;

/// Capacity of a reply body
pub const REPLY_BODY_LEN: usize = 160;

/// Reply body text
pub type ReplyBody = String<REPLY_BODY_LEN>;

/// Encoded status line and headers
pub type ResponseHead = String<128>;

/// Response status
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum StatusCode {
    /// 200: request applied
    Ok,
    /// 400: malformed line or bad parameter
    BadRequest,
    /// 404: no such endpoint
    NotFound,
    /// 405: endpoint exists but only answers GET
    MethodNotAllowed,
}

impl StatusCode {
    /// Numeric status code
    pub fn code(self) -> u16 {
        match self {
            StatusCode::Ok => 200,
            StatusCode::BadRequest => 400,
            StatusCode::NotFound => 404,
            StatusCode::MethodNotAllowed => 405,
        }
    }

    /// Reason phrase
    pub fn reason(self) -> &'static str {
        match self {
            StatusCode::Ok => "OK",
            StatusCode::BadRequest => "Bad Request",
            StatusCode::NotFound => "Not Found",
            StatusCode::MethodNotAllowed => "Method Not Allowed",
        }
    }
}

/// Body media type
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum ContentType {
    /// Plain UTF-8 text
    Text,
    /// JSON document (vote report)
    Json,
}

impl ContentType {
    /// MIME type for the `Content-Type` header
    pub fn mime(self) -> &'static str {
        match self {
            ContentType::Text => "text/plain; charset=utf-8",
            ContentType::Json => "application/json",
        }
    }
}

/// Complete response produced by the control loop
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct Reply {
    /// Response status
    pub status: StatusCode,
    /// Media type of `body`
    pub content_type: ContentType,
    /// Response body, without headers
    pub body: ReplyBody,
}

impl Reply {
    /// Plain-text reply; output beyond the body capacity is dropped
    pub fn text(status: StatusCode, args: fmt::Arguments<'_>) -> Self {
        let mut body = ReplyBody::new();
        let _ = body.write_fmt(args);
        let _ = body.push('\n');
        Self {
            status,
            content_type: ContentType::Text,
            body,
        }
    }

    /// 200 plain-text reply
    pub fn ok(args: fmt::Arguments<'_>) -> Self {
        Self::text(StatusCode::Ok, args)
    }

    /// `{"A":n,"B":m}` vote report
    pub fn votes(counts: VoteCounts) -> Self {
        let mut body = ReplyBody::new();
        let _ = write!(body, "{{\"A\":{},\"B\":{}}}", counts.a, counts.b);
        Self {
            status: StatusCode::Ok,
            content_type: ContentType::Json,
            body,
        }
    }

    /// Status line and headers, ending with the blank line
    pub fn head(&self) -> ResponseHead {
        let mut head = ResponseHead::new();
        let _ = write!(
            head,
            "HTTP/1.1 {} {}\r\nContent-Type: {}\r\nContent-Length: {}\r\nConnection: close\r\n\r\n",
            self.status.code(),
            self.status.reason(),
            self.content_type.mime(),
            self.body.len()
        );
        head
    }

    /// Body bytes
    pub fn body(&self) -> &[u8] {
        self.body.as_bytes()
    }
}

impl From<RequestError> for Reply {
    fn from(e: RequestError) -> Self {
        match e {
            RequestError::Malformed => {
                Reply::text(StatusCode::BadRequest, format_args!("malformed request"))
            }
            RequestError::MethodNotAllowed => Reply::text(
                StatusCode::MethodNotAllowed,
                format_args!("only GET is supported"),
            ),
            RequestError::NotFound => Reply::text(StatusCode::NotFound, format_args!("not found")),
            RequestError::MissingSteps => Reply::text(
                StatusCode::BadRequest,
                format_args!("missing 'steps' parameter"),
            ),
            RequestError::InvalidSteps => Reply::text(
                StatusCode::BadRequest,
                format_args!("'steps' must be an integer"),
            ),
        }
    }
}

impl From<MotionError> for Reply {
    fn from(e: MotionError) -> Self {
        match e {
            MotionError::LimitExceeded { requested, limit } => Reply::text(
                StatusCode::BadRequest,
                format_args!("steps out of range: {} (limit +/-{})", requested, limit),
            ),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_vote_json() {
        let reply = Reply::votes(VoteCounts { a: 1, b: 0 });
        assert_eq!(reply.body.as_str(), "{\"A\":1,\"B\":0}");
        assert_eq!(reply.content_type, ContentType::Json);
    }

    #[test]
    fn test_head_carries_length_and_close() {
        let reply = Reply::votes(VoteCounts { a: 12, b: 3 });
        assert_eq!(
            reply.head().as_str(),
            "HTTP/1.1 200 OK\r\nContent-Type: application/json\r\nContent-Length: 14\r\nConnection: close\r\n\r\n"
        );
    }

    #[test]
    fn test_limit_error_echoes_limit() {
        let reply = Reply::from(MotionError::LimitExceeded {
            requested: 9000,
            limit: 8192,
        });
        assert_eq!(reply.status, StatusCode::BadRequest);
        assert_eq!(reply.body.as_str(), "steps out of range: 9000 (limit +/-8192)\n");
    }

    #[test]
    fn test_request_errors_map_to_status() {
        assert_eq!(Reply::from(RequestError::NotFound).status.code(), 404);
        assert_eq!(Reply::from(RequestError::MethodNotAllowed).status.code(), 405);
        assert_eq!(Reply::from(RequestError::Malformed).status.code(), 400);
        assert_eq!(Reply::from(RequestError::MissingSteps).status.code(), 400);
        assert_eq!(Reply::from(RequestError::InvalidSteps).status.code(), 400);
    }

    #[test]
    fn test_longest_head_fits() {
        let mut reply = Reply::from(RequestError::MethodNotAllowed);
        while reply.body.push('x').is_ok() {}
        let head = reply.head();
        assert!(head.ends_with("Content-Length: 160\r\nConnection: close\r\n\r\n"));
    }

    #[test]
    fn test_overlong_text_truncated() {
        let long = "y".repeat(300);
        let reply = Reply::ok(format_args!("{}", long));
        assert!(reply.body.len() <= REPLY_BODY_LEN);
        assert_eq!(reply.status, StatusCode::Ok);
    }
}
