/// Best-effort MIME type for `contents` stored at `path`.
///
/// The extension wins when it is known; otherwise empty content is
/// `application/x-empty`, valid UTF-8 is `text/plain` and anything else is
/// `application/octet-stream`.
pub fn guess_mime_type(path: &str, contents: &[u8]) -> String {
    // Query strings mark resource variants, not part of the file name.
    let name = path.split('?').next().unwrap_or(path);

    if let Some(mime) = mime_guess::from_path(name).first_raw() {
        return mime.to_owned();
    }

    let fallback = if contents.is_empty() {
        "application/x-empty"
    } else if std::str::from_utf8(contents).is_ok() {
        "text/plain"
    } else {
        "application/octet-stream"
    };
    fallback.to_owned()
}
