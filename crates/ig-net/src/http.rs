//! HTTP/1.1 wire codec: request encoding, response parsing, body decoding.

use brotli::Decompressor;
use flate2::read::DeflateDecoder;
use flate2::read::GzDecoder;
use flate2::read::ZlibDecoder;
use ig_core::BrowserError;
use ig_core::BrowserResult;
use ig_core::codes;
use std::collections::BTreeMap;
use std::collections::btree_map;
use std::io::Cursor;
use std::io::Read;
use std::io::Write;

/// Value sent in every `User-Agent` header.
pub const USER_AGENT: &str = "Ignis/SimpleBrowser";

const READ_CHUNK_BYTES: usize = 4096;

/// Header map keyed by lower-cased name. Last write wins.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Headers {
    entries: BTreeMap<String, String>,
}

impl Headers {
    pub fn new() -> Self {
        Self::default()
    }

    /// Inserts a request header after checking it is safe to put on the wire.
    pub fn insert(&mut self, name: &str, value: &str) -> BrowserResult<()> {
        if !is_valid_header_name(name) {
            return Err(BrowserError::new(
                codes::HEADER_NAME_INVALID,
                format!("invalid HTTP header name `{name}`"),
            ));
        }

        if value.bytes().any(|byte| matches!(byte, b'\r' | b'\n' | 0)) {
            return Err(BrowserError::new(
                codes::HEADER_VALUE_INVALID,
                format!("invalid characters found in HTTP header `{name}`"),
            ));
        }

        self.insert_parsed(name, value);
        Ok(())
    }

    fn insert_parsed(&mut self, name: &str, value: &str) {
        self.entries
            .insert(name.trim().to_ascii_lowercase(), value.to_owned());
    }

    pub fn get(&self, name: &str) -> Option<&str> {
        self.entries
            .get(&name.to_ascii_lowercase())
            .map(String::as_str)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.entries.contains_key(&name.to_ascii_lowercase())
    }

    pub fn iter(&self) -> btree_map::Iter<'_, String, String> {
        self.entries.iter()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl<'a> IntoIterator for &'a Headers {
    type Item = (&'a String, &'a String);
    type IntoIter = btree_map::Iter<'a, String, String>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

/// Builds the bytes of a `GET` request.
///
/// Caller headers go first, then `Connection: close` unless the caller set a
/// connection header, then `Host` and `User-Agent`.
pub fn encode_request(path: &str, host: &str, headers: &Headers) -> Vec<u8> {
    let mut encoded = String::new();
    encoded.push_str(&format!("GET {path} HTTP/1.1\r\n"));

    for (name, value) in headers {
        encoded.push_str(&format!("{name}: {value}\r\n"));
    }
    if !headers.contains("connection") {
        encoded.push_str("Connection: close\r\n");
    }
    encoded.push_str(&format!("Host: {host}\r\n"));
    encoded.push_str(&format!("User-Agent: {USER_AGENT}\r\n"));
    encoded.push_str("\r\n");

    encoded.into_bytes()
}

pub fn write_request<S: Write + ?Sized>(
    stream: &mut S,
    path: &str,
    host: &str,
    headers: &Headers,
) -> BrowserResult<()> {
    let encoded = encode_request(path, host, headers);
    stream.write_all(&encoded).map_err(|error| {
        BrowserError::io(codes::WRITE_FAILED, "failed to write HTTP request", &error)
    })?;
    stream.flush().map_err(|error| {
        BrowserError::io(codes::WRITE_FAILED, "failed to flush HTTP request", &error)
    })
}

/// Reads until the peer closes the connection.
///
/// A TLS peer that hangs up without `close_notify` surfaces as `UnexpectedEof`;
/// that is treated as the end of the body.
pub fn read_until_close<S: Read + ?Sized>(stream: &mut S) -> BrowserResult<Vec<u8>> {
    let mut buffer = Vec::new();
    let mut chunk = [0_u8; READ_CHUNK_BYTES];

    loop {
        match stream.read(&mut chunk) {
            Ok(0) => break,
            Ok(read) => buffer.extend_from_slice(&chunk[..read]),
            Err(error) if error.kind() == std::io::ErrorKind::Interrupted => continue,
            Err(error) if error.kind() == std::io::ErrorKind::UnexpectedEof => {
                log::debug!("peer closed without shutdown after {} bytes", buffer.len());
                break;
            }
            Err(error) => {
                return Err(BrowserError::io(
                    codes::READ_FAILED,
                    "failed while reading HTTP response",
                    &error,
                ));
            }
        }
    }

    Ok(buffer)
}

/// Response as it came off the wire, before any content decoding.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RawResponse {
    pub version: String,
    pub status_code: String,
    pub reason: String,
    pub headers: Headers,
    pub body: Vec<u8>,
}

/// Splits a response into status line, header block and body.
///
/// The header block ends at the first line that is exactly `\r\n`; everything
/// after it is the body, byte for byte.
pub fn parse_response(raw: &[u8]) -> BrowserResult<RawResponse> {
    let mut lines = raw.split_inclusive(|byte| *byte == b'\n');
    let status_bytes = lines.next().unwrap_or_default();
    let mut offset = status_bytes.len();
    let (version, status_code, reason) =
        parse_status_line(&String::from_utf8_lossy(status_bytes))?;

    let mut headers = Headers::new();
    for line in lines {
        offset += line.len();
        if line == b"\r\n" {
            break;
        }

        let text = String::from_utf8_lossy(line);
        let text: &str = &text;
        let (name, value) = text.split_once(':').unwrap_or((text, text));
        headers.insert_parsed(name, value.trim());
    }

    Ok(RawResponse {
        version,
        status_code,
        reason,
        headers,
        body: raw[offset..].to_vec(),
    })
}

fn parse_status_line(line: &str) -> BrowserResult<(String, String, String)> {
    let mut parts = line.splitn(3, ' ');
    match (parts.next(), parts.next(), parts.next()) {
        (Some(version), Some(code), Some(reason)) => Ok((
            version.to_owned(),
            code.to_owned(),
            reason.trim_end().to_owned(),
        )),
        _ => Err(BrowserError::new(
            codes::MALFORMED_RESPONSE,
            format!("status line `{}` is not `VERSION CODE REASON`", line.trim_end()),
        )),
    }
}

/// Returns the encoding to undo, if any.
///
/// `transfer-encoding` and `content-encoding` are honored only when the request
/// carried an `accept-encoding` equal to the response token.
pub fn negotiate_encoding(
    request: &Headers,
    response: &Headers,
) -> BrowserResult<Option<String>> {
    let accepted = request.get("accept-encoding");
    let mut negotiated = None;

    for name in ["transfer-encoding", "content-encoding"] {
        let Some(encoding) = response.get(name) else {
            continue;
        };

        if accepted != Some(encoding) {
            return Err(BrowserError::new(
                codes::UNSUPPORTED_ENCODING,
                format!("response {name} `{encoding}` was not requested via accept-encoding"),
            ));
        }

        negotiated = Some(encoding.to_owned());
    }

    Ok(negotiated)
}

pub fn decode_body(encoding: &str, body: &[u8]) -> BrowserResult<Vec<u8>> {
    match encoding.trim().to_ascii_lowercase().as_str() {
        "identity" => Ok(body.to_vec()),
        "gzip" | "x-gzip" => decode_gzip(body),
        "deflate" => decode_deflate(body),
        "br" => decode_brotli(body),
        other => Err(BrowserError::new(
            codes::UNSUPPORTED_ENCODING,
            format!("encoding `{other}` is not supported"),
        )),
    }
}

/// Converts body bytes to text, replacing invalid UTF-8.
pub fn body_text(body: Vec<u8>) -> String {
    match String::from_utf8(body) {
        Ok(text) => text,
        Err(error) => {
            log::warn!("response body is not valid UTF-8; decoding lossily");
            String::from_utf8_lossy(error.as_bytes()).into_owned()
        }
    }
}

fn decode_gzip(body: &[u8]) -> BrowserResult<Vec<u8>> {
    let mut decoder = GzDecoder::new(Cursor::new(body));
    let mut decoded = Vec::new();
    decoder.read_to_end(&mut decoded).map_err(|error| {
        BrowserError::new(codes::DECODE_FAILED, format!("gzip decode failed: {error}"))
    })?;
    Ok(decoded)
}

fn decode_deflate(body: &[u8]) -> BrowserResult<Vec<u8>> {
    let mut zlib_decoder = ZlibDecoder::new(Cursor::new(body));
    let mut zlib_decoded = Vec::new();
    if zlib_decoder.read_to_end(&mut zlib_decoded).is_ok() {
        return Ok(zlib_decoded);
    }

    let mut raw_decoder = DeflateDecoder::new(Cursor::new(body));
    let mut raw_decoded = Vec::new();
    raw_decoder.read_to_end(&mut raw_decoded).map_err(|error| {
        BrowserError::new(codes::DECODE_FAILED, format!("deflate decode failed: {error}"))
    })?;
    Ok(raw_decoded)
}

fn decode_brotli(body: &[u8]) -> BrowserResult<Vec<u8>> {
    let mut decoder = Decompressor::new(Cursor::new(body), READ_CHUNK_BYTES);
    let mut decoded = Vec::new();
    decoder.read_to_end(&mut decoded).map_err(|error| {
        BrowserError::new(codes::DECODE_FAILED, format!("brotli decode failed: {error}"))
    })?;
    Ok(decoded)
}

fn is_valid_header_name(name: &str) -> bool {
    !name.is_empty() && name.bytes().all(is_token_char)
}

fn is_token_char(byte: u8) -> bool {
    byte.is_ascii_alphanumeric()
        || matches!(
            byte,
            b'!' | b'#'
                | b'$'
                | b'%'
                | b'&'
                | b'\''
                | b'*'
                | b'+'
                | b'-'
                | b'.'
                | b'^'
                | b'_'
                | b'`'
                | b'|'
                | b'~'
        )
}
