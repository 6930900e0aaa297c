//! Decoding of `application/x-www-form-urlencoded` and
//! `multipart/form-data` payloads into [`Params`].

use super::Params;
use crate::error::Error;

/// The kind of form payload a content type announces.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FormKind {
    UrlEncoded,
    Multipart,
}

impl FormKind {
    /// Classify a content type, ignoring parameters such as `charset`.
    pub fn of(content_type: &str) -> Option<FormKind> {
        let mime: mime::Mime = content_type.parse().ok()?;

        if mime.type_() == mime::APPLICATION && mime.subtype() == mime::WWW_FORM_URLENCODED {
            Some(FormKind::UrlEncoded)
        } else if mime.type_() == mime::MULTIPART && mime.subtype() == mime::FORM_DATA {
            Some(FormKind::Multipart)
        } else {
            None
        }
    }
}

/// Decode a urlencoded query string or body.
pub fn urlencoded(input: &[u8]) -> Result<Params, Error> {
    serde_urlencoded::from_bytes::<Vec<(String, String)>>(input)
        .map(Params::from)
        .map_err(|err| Error::Form(err.to_string()))
}

/// Decode the body of a form submission according to `content_type`.
pub fn decode(content_type: &str, body: &[u8]) -> Result<Params, Error> {
    match FormKind::of(content_type) {
        Some(FormKind::UrlEncoded) => urlencoded(body),
        Some(FormKind::Multipart) => {
            let boundary = boundary(content_type)
                .ok_or_else(|| Error::Form("missing multipart boundary".to_owned()))?;
            multipart(body, boundary)
        }
        None => Ok(Params::new()),
    }
}

/// Extract the `boundary` parameter of a multipart content type.
pub fn boundary(content_type: &str) -> Option<&str> {
    content_type
        .split(';')
        .filter_map(|param| param.trim().strip_prefix("boundary="))
        .map(|boundary| boundary.trim_matches('"'))
        .find(|boundary| !boundary.is_empty())
}

/// Decode the text fields of a multipart body. Uploaded files are
/// kept as their (lossily decoded) content under the field name.
pub fn multipart(body: &[u8], boundary: &str) -> Result<Params, Error> {
    let delimiter = format!("--{}", boundary);
    let body = String::from_utf8_lossy(body);
    let mut params = Params::new();

    for part in body.split(delimiter.as_str()).skip(1) {
        if part.starts_with("--") {
            break;
        }

        let part = part.strip_prefix("\r\n").unwrap_or(part);
        let part = part.strip_suffix("\r\n").unwrap_or(part);

        let (head, content) = match part.find("\r\n\r\n") {
            Some(pos) => (&part[..pos], &part[pos + 4..]),
            None => return Err(Error::Form("multipart part without headers".to_owned())),
        };

        let name = head
            .lines()
            .filter_map(|line| line.split_once(':'))
            .find(|(key, _)| key.trim().eq_ignore_ascii_case("content-disposition"))
            .and_then(|(_, value)| disposition_param(value, "name"));

        if let Some(name) = name {
            params.push(name, content);
        }
    }

    Ok(params)
}

fn disposition_param<'a>(value: &'a str, param: &str) -> Option<&'a str> {
    value.split(';').map(str::trim).find_map(|item| {
        let (key, val) = item.split_once('=')?;
        (key.trim() == param).then(|| val.trim().trim_matches('"'))
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn kinds() {
        assert_eq!(
            FormKind::of("application/x-www-form-urlencoded; charset=utf-8"),
            Some(FormKind::UrlEncoded)
        );
        assert_eq!(
            FormKind::of("multipart/form-data; boundary=x"),
            Some(FormKind::Multipart)
        );
        assert_eq!(FormKind::of("text/plain"), None);
        assert_eq!(FormKind::of("not a mime"), None);
    }

    #[test]
    fn urlencoded_pairs() {
        let params = urlencoded(b"a=1&b=two+words&a=3").unwrap();
        assert_eq!(params.get("b"), Some("two words"));
        assert_eq!(params.get_all("a").collect::<Vec<_>>(), ["1", "3"]);
    }

    #[test]
    fn multipart_fields() {
        let body = "--xyz\r\n\
                    Content-Disposition: form-data; name=\"title\"\r\n\
                    \r\n\
                    My Document\r\n\
                    --xyz\r\n\
                    Content-Disposition: form-data; name=\"file\"; filename=\"a.txt\"\r\n\
                    Content-Type: text/plain\r\n\
                    \r\n\
                    File A\r\n\
                    --xyz--\r\n";

        let params = decode("multipart/form-data; boundary=\"xyz\"", body.as_bytes()).unwrap();
        assert_eq!(params.get("title"), Some("My Document"));
        assert_eq!(params.get("file"), Some("File A"));
    }

    #[test]
    fn multipart_without_boundary() {
        assert!(matches!(
            decode("multipart/form-data", b""),
            Err(Error::Form(_))
        ));
    }
}
