//! Enketo API client
//!
//! Asks Enketo for a URL that opens a form (or a submitted instance) in the
//! web editor or the read-only viewer.
//!
//! A missing configuration is not an error: every entry point answers
//! [`EnketoUrl::Unavailable`] without touching the network and callers decide
//! what to show instead.

use fieldsight_common::config::EnketoSettings;
use secrecy::ExposeSecret;
use serde_json::{Map, Value};
use std::collections::BTreeMap;
use std::sync::Arc;
use thiserror::Error;
use tracing::{debug, info, warn};

use super::enketo_sanitizer::{AttachmentPathSanitizer, InstanceXmlSanitizer};

const USER_AGENT: &str = concat!("fieldsight-kc/", env!("CARGO_PKG_VERSION"));
const VIEW_SUFFIX: &str = "/view";

/// Enketo client errors
#[derive(Debug, Error)]
pub enum EnketoError {
    /// Enketo answered with an error status and a `message`
    #[error("Enketo error: {0}")]
    Remote(String),

    /// The request never produced a response
    #[error("Network error: {0}")]
    Network(String),
}

/// Outcome of an Enketo call
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EnketoUrl {
    EditUrl(String),
    ViewUrl(String),
    OfflineUrl(String),
    GenericUrl(String),
    /// Not configured, unparseable response, or no known URL key
    Unavailable,
    /// Error status with a `message` from Enketo
    RemoteError(String),
}

impl EnketoUrl {
    /// The URL for any of the URL-bearing variants
    pub fn url(&self) -> Option<&str> {
        match self {
            EnketoUrl::EditUrl(url)
            | EnketoUrl::ViewUrl(url)
            | EnketoUrl::OfflineUrl(url)
            | EnketoUrl::GenericUrl(url) => Some(url),
            EnketoUrl::Unavailable | EnketoUrl::RemoteError(_) => None,
        }
    }

    /// `Ok(Some(url))`, `Ok(None)` when unavailable, `Err` for a remote error
    pub fn into_result(self) -> Result<Option<String>, EnketoError> {
        match self {
            EnketoUrl::EditUrl(url)
            | EnketoUrl::ViewUrl(url)
            | EnketoUrl::OfflineUrl(url)
            | EnketoUrl::GenericUrl(url) => Ok(Some(url)),
            EnketoUrl::Unavailable => Ok(None),
            EnketoUrl::RemoteError(message) => Err(EnketoError::Remote(message)),
        }
    }
}

/// Parameters of one Enketo call
#[derive(Debug, Clone, Default)]
pub struct EnketoRequest {
    /// Server URL Enketo fetches the form from (`<protocol>://<host>/<user>`)
    pub form_url: String,
    pub id_string: String,
    pub instance_xml: Option<String>,
    pub instance_id: Option<String>,
    pub return_url: Option<String>,
    /// Attachment file name -> download URL
    pub attachments: BTreeMap<String, String>,
}

impl EnketoRequest {
    pub fn for_form(form_url: impl Into<String>, id_string: impl Into<String>) -> Self {
        Self {
            form_url: form_url.into(),
            id_string: id_string.into(),
            ..Self::default()
        }
    }

    pub fn with_instance(
        mut self,
        instance_xml: impl Into<String>,
        instance_id: impl Into<String>,
        return_url: Option<String>,
    ) -> Self {
        self.instance_xml = Some(instance_xml.into());
        self.instance_id = Some(instance_id.into());
        self.return_url = return_url;
        self
    }

    pub fn with_attachments(mut self, attachments: BTreeMap<String, String>) -> Self {
        self.attachments = attachments;
        self
    }

    /// Instance fields are only sent when both the XML and the id are present
    fn instance(&self) -> Option<(&str, &str)> {
        match (&self.instance_xml, &self.instance_id) {
            (Some(xml), Some(id)) => Some((xml.as_str(), id.as_str())),
            _ => None,
        }
    }
}

/// Which Enketo page the caller wants
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EnketoMode {
    /// Web editor (`edit_url`)
    Edit,
    /// Older entry point: editor URL without attachment handling
    Legacy,
    /// Read-only viewer (`view_url`)
    View,
}

/// Enketo API client
pub struct EnketoClient {
    http_client: reqwest::Client,
    settings: EnketoSettings,
    sanitizer: Arc<dyn InstanceXmlSanitizer>,
}

impl EnketoClient {
    pub fn new(settings: EnketoSettings) -> Result<Self, EnketoError> {
        if !settings.verify_tls {
            warn!("Enketo TLS certificate verification is disabled");
        }

        let http_client = reqwest::Client::builder()
            .user_agent(USER_AGENT)
            .timeout(settings.timeout())
            .danger_accept_invalid_certs(!settings.verify_tls)
            .build()
            .map_err(|e| EnketoError::Network(e.to_string()))?;

        Ok(Self {
            http_client,
            settings,
            sanitizer: Arc::new(AttachmentPathSanitizer),
        })
    }

    /// Replace the instance XML sanitizer used when attachments are sent
    pub fn with_sanitizer(mut self, sanitizer: Arc<dyn InstanceXmlSanitizer>) -> Self {
        self.sanitizer = sanitizer;
        self
    }

    pub fn is_configured(&self) -> bool {
        self.settings.is_configured()
    }

    /// URL of the web editor for a form or a submitted instance
    pub async fn edit_url(&self, request: &EnketoRequest) -> Result<EnketoUrl, EnketoError> {
        self.call(EnketoMode::Edit, request).await
    }

    /// Editor URL through the older call: attachments are not sent
    pub async fn url(&self, request: &EnketoRequest) -> Result<EnketoUrl, EnketoError> {
        self.call(EnketoMode::Legacy, request).await
    }

    /// URL of the read-only viewer
    pub async fn view_url(&self, request: &EnketoRequest) -> Result<EnketoUrl, EnketoError> {
        self.call(EnketoMode::View, request).await
    }

    async fn call(
        &self,
        mode: EnketoMode,
        request: &EnketoRequest,
    ) -> Result<EnketoUrl, EnketoError> {
        let Some(endpoint) = self.endpoint(mode, request.instance().is_some()) else {
            debug!(form_id = %request.id_string, "Enketo not configured");
            return Ok(EnketoUrl::Unavailable);
        };

        let fields = self.form_fields(mode, request);
        let token = self
            .settings
            .api_token
            .as_ref()
            .map(|t| t.expose_secret().as_str())
            .unwrap_or_default();

        debug!(
            form_id = %request.id_string,
            endpoint = %endpoint,
            with_instance = request.instance().is_some(),
            "Querying Enketo API"
        );

        let response = self
            .http_client
            .post(&endpoint)
            .basic_auth(token, Some(""))
            .form(&fields)
            .send()
            .await
            .map_err(|e| EnketoError::Network(e.to_string()))?;

        let status = response.status().as_u16();
        let body = response
            .bytes()
            .await
            .map_err(|e| EnketoError::Network(e.to_string()))?;

        let outcome = interpret_response(mode, status, &body, self.settings.offline_surveys);
        match &outcome {
            EnketoUrl::RemoteError(message) => {
                warn!(status, form_id = %request.id_string, "Enketo rejected request: {}", message)
            }
            EnketoUrl::Unavailable => {
                warn!(status, form_id = %request.id_string, "Enketo returned no usable URL")
            }
            _ => info!(status, form_id = %request.id_string, "Enketo URL obtained"),
        }

        Ok(outcome)
    }

    /// Full endpoint URL, or `None` when the needed settings are missing
    fn endpoint(&self, mode: EnketoMode, with_instance: bool) -> Option<String> {
        if !self.settings.is_configured() {
            return None;
        }
        let base = self.settings.url.as_deref()?;
        let path = if with_instance {
            self.settings.api_instance_path.as_deref()?
        } else {
            self.settings.api_survey_path.as_deref()?
        };

        let mut endpoint = format!("{}{}", base, path);
        if mode == EnketoMode::View {
            endpoint.push_str(VIEW_SUFFIX);
        }
        Some(endpoint)
    }

    /// Form-encoded request body
    fn form_fields(&self, mode: EnketoMode, request: &EnketoRequest) -> Vec<(String, String)> {
        let mut fields = vec![
            ("form_id".to_string(), request.id_string.clone()),
            ("server_url".to_string(), request.form_url.clone()),
        ];

        let Some((xml, instance_id)) = request.instance() else {
            return fields;
        };

        let send_attachments = mode != EnketoMode::Legacy && !request.attachments.is_empty();
        let instance = if send_attachments {
            let names: Vec<&str> = request.attachments.keys().map(String::as_str).collect();
            self.sanitizer.clean(&names, xml)
        } else {
            xml.to_string()
        };

        fields.push(("instance".to_string(), instance));
        fields.push(("instance_id".to_string(), instance_id.to_string()));
        if let Some(return_url) = &request.return_url {
            fields.push(("return_url".to_string(), return_url.clone()));
        }

        if send_attachments {
            for (name, url) in &request.attachments {
                fields.push((format!("instance_attachments[{}]", name), url.clone()));
            }
        }

        fields
    }
}

/// Map an Enketo HTTP response onto an [`EnketoUrl`]
///
/// Success statuses pick the first present key in order: the mode's own URL
/// (`edit_url` or `view_url`), `offline_url` when offline surveys are enabled,
/// then `url`. Other statuses surface `message` when there is one.
pub fn interpret_response(
    mode: EnketoMode,
    status: u16,
    body: &[u8],
    offline_surveys: bool,
) -> EnketoUrl {
    // Keys are read one by one so an unexpected value type in one field does
    // not hide the others
    let Ok(parsed) = serde_json::from_slice::<Map<String, Value>>(body) else {
        return EnketoUrl::Unavailable;
    };
    let text = |key: &str| parsed.get(key).and_then(Value::as_str).map(str::to_string);

    if !matches!(status, 200 | 201) {
        return text("message")
            .map(EnketoUrl::RemoteError)
            .unwrap_or(EnketoUrl::Unavailable);
    }

    let primary = match mode {
        EnketoMode::Edit | EnketoMode::Legacy => text("edit_url").map(EnketoUrl::EditUrl),
        EnketoMode::View => text("view_url").map(EnketoUrl::ViewUrl),
    };

    primary
        .or_else(|| {
            text("offline_url")
                .filter(|_| offline_surveys)
                .map(EnketoUrl::OfflineUrl)
        })
        .or_else(|| text("url").map(EnketoUrl::GenericUrl))
        .unwrap_or(EnketoUrl::Unavailable)
}
