use super::context::RequestContext;
use super::multipart::{parse_boundary, parse_multipart, MultipartConfig, MultipartError, UploadedFile};

/// Decoded form body: text fields in order plus uploaded files.
///
/// Built at most once per request by the binder.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FormData {
    fields: Vec<(String, String)>,
    files: Vec<UploadedFile>,
}

impl FormData {
    /// Decode the request body according to its content type.
    ///
    /// `application/x-www-form-urlencoded` yields text fields only;
    /// `multipart/form-data` yields text parts as fields and parts carrying a
    /// filename as files. Any other content type yields an empty form.
    pub fn from_request(
        ctx: &RequestContext,
        config: &MultipartConfig,
    ) -> Result<Self, MultipartError> {
        let Some(content_type) = ctx.content_type() else {
            return Ok(Self::default());
        };
        let mime = content_type
            .split(';')
            .next()
            .unwrap_or_default()
            .trim()
            .to_ascii_lowercase();

        match mime.as_str() {
            "application/x-www-form-urlencoded" => Ok(Self {
                fields: url::form_urlencoded::parse(&ctx.body)
                    .map(|(k, v)| (k.into_owned(), v.into_owned()))
                    .collect(),
                files: Vec::new(),
            }),
            "multipart/form-data" => {
                let boundary = parse_boundary(content_type)?;
                let mut form = Self::default();
                for part in parse_multipart(&ctx.body, &boundary, config)? {
                    if part.filename.is_some() {
                        form.files.push(UploadedFile::from(part));
                    } else {
                        let text = String::from_utf8_lossy(&part.data).into_owned();
                        form.fields.push((part.name, text));
                    }
                }
                Ok(form)
            }
            _ => Ok(Self::default()),
        }
    }

    /// All values of a text field, in body order
    pub fn field_values<'a>(&'a self, name: &'a str) -> impl Iterator<Item = &'a str> + 'a {
        self.fields
            .iter()
            .filter(move |(k, _)| k == name)
            .map(|(_, v)| v.as_str())
    }

    /// Last value of a text field
    #[must_use]
    pub fn text_part(&self, name: &str) -> Option<&str> {
        self.field_values(name).last()
    }

    /// First file uploaded under `name`
    #[must_use]
    pub fn file(&self, name: &str) -> Option<&UploadedFile> {
        self.files.iter().find(|f| f.field_name() == name)
    }

    #[must_use]
    pub fn files(&self) -> &[UploadedFile] {
        &self.files
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use http::Method;

    #[test]
    fn test_urlencoded() {
        let ctx = RequestContext::new(Method::POST, "/user-form")
            .with_form(&[("first_name", "Ann"), ("tag", "a"), ("tag", "b")]);
        let form = FormData::from_request(&ctx, &MultipartConfig::default()).unwrap();
        assert_eq!(form.text_part("first_name"), Some("Ann"));
        assert_eq!(form.field_values("tag").collect::<Vec<_>>(), vec!["a", "b"]);
        assert!(form.files().is_empty());
    }

    #[test]
    fn test_multipart_splits_files() {
        let body = "--b1\r\nContent-Disposition: form-data; name=\"details\"\r\n\r\n{\"a\":1}\r\n\
                    --b1\r\nContent-Disposition: form-data; name=\"file\"; filename=\"x.txt\"\r\n\r\nhi\r\n\
                    --b1--\r\n";
        let ctx = RequestContext::new(Method::POST, "/user-json")
            .with_header("content-type", "multipart/form-data; boundary=b1")
            .with_body(body);
        let form = FormData::from_request(&ctx, &MultipartConfig::default()).unwrap();
        assert_eq!(form.text_part("details"), Some("{\"a\":1}"));
        assert_eq!(form.file("file").map(UploadedFile::name), Some("x.txt"));
        assert!(form.file("details").is_none());
    }

    #[test]
    fn test_other_content_type_is_empty() {
        let ctx = RequestContext::new(Method::POST, "/x").with_json(&serde_json::json!({"a": 1}));
        let form = FormData::from_request(&ctx, &MultipartConfig::default()).unwrap();
        assert_eq!(form, FormData::default());
    }
}
