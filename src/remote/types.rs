//! Query and error payloads exchanged with the files backend.

#[derive(Debug, serde::Serialize)]
pub(super) struct ListingQuery<'a> {
    pub(super) path: &'a str,
    pub(super) recursive: bool,
    #[serde(rename = "ref")]
    pub(super) reference: &'a str,
}

#[derive(Debug, serde::Serialize)]
pub(super) struct CompareQuery<'a> {
    pub(super) from: &'a str,
    pub(super) to: &'a str,
}

#[derive(Debug, Default, serde::Deserialize)]
pub(super) struct ErrorBody {
    #[serde(default)]
    pub(super) error: Option<String>,
}
