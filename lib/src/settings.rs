//! The settings document: six leaf elements under a `Setting` root.
//!
//! ```xml
//! <?xml version="1.0" encoding="UTF-8" standalone="no"?>
//! <!--DBTransformer Settings-->
//! <Setting>
//!   <jdbc>jdbc:sqlite:/data/shop.db</jdbc>
//!   <user>admin</user>
//!   <driver>org.sqlite.JDBC</driver>
//!   <outputPath>/data/shop.owl</outputPath>
//!   <baseUri>http://example.org/shop/</baseUri>
//!   <format>3</format>
//! </Setting>
//! ```

use crate::errors::{Result, TransformError};
use crate::options::OutputFormat;
use crate::params::ConnectionParameters;
use encoding_rs::{Encoding, UTF_8};
use lazy_static::lazy_static;
use log::{debug, warn};
use quick_xml::events::{BytesDecl, BytesEnd, BytesStart, BytesText, Event};
use quick_xml::{Reader, Writer};
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::path::Path;

const ROOT: &str = "Setting";
const COMMENT: &str = "DBTransformer Settings";

lazy_static! {
    static ref DECLARED_ENCODING: Regex =
        Regex::new(r#"^\s*<\?xml[^>]*encoding\s*=\s*["']([A-Za-z0-9._:-]+)["']"#).unwrap();
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Settings {
    pub jdbc: String,
    pub user: String,
    pub driver: String,
    pub output_path: String,
    pub base_uri: String,
    /// Output format code, see [`OutputFormat::from_code`].
    pub format: i32,
}

impl Settings {
    pub fn output_format(&self) -> OutputFormat {
        OutputFormat::from_code(self.format)
    }

    /// Connection parameters for the stored connection. The password is never persisted.
    pub fn connection_parameters(&self, password: Option<&str>) -> ConnectionParameters {
        ConnectionParameters::new(
            self.driver.clone(),
            self.jdbc.clone(),
            self.user.clone(),
            password.unwrap_or_default(),
        )
    }

    /// Reads a settings file, honouring the encoding named in its XML declaration.
    pub fn load(path: &Path) -> Result<Self> {
        debug!("Reading settings from {}", path.display());
        let bytes = std::fs::read(path)?;
        Self::from_bytes(&bytes)
    }

    pub fn from_bytes(bytes: &[u8]) -> Result<Self> {
        let head = String::from_utf8_lossy(&bytes[..bytes.len().min(200)]);
        let encoding = DECLARED_ENCODING
            .captures(&head)
            .and_then(|c| Encoding::for_label(c[1].as_bytes()))
            .unwrap_or(UTF_8);
        let (text, _, had_errors) = encoding.decode(bytes);
        if had_errors {
            warn!("Settings document has bytes that are not valid {}", encoding.name());
        }
        Self::from_xml(&text)
    }

    pub fn from_xml(text: &str) -> Result<Self> {
        let mut reader = Reader::from_str(text);
        reader.config_mut().trim_text(true);
        let mut settings = Settings::default();
        let mut current: Option<String> = None;
        let mut saw_root = false;
        loop {
            match reader.read_event().map_err(settings_error)? {
                Event::Start(e) => {
                    let name = String::from_utf8_lossy(e.local_name().as_ref()).into_owned();
                    if !saw_root {
                        if name != ROOT {
                            return Err(TransformError::Settings(format!("root element is {}, not {}", name, ROOT)));
                        }
                        saw_root = true;
                    } else {
                        current = Some(name);
                    }
                }
                Event::Empty(e) if !saw_root => {
                    let name = String::from_utf8_lossy(e.local_name().as_ref()).into_owned();
                    if name != ROOT {
                        return Err(TransformError::Settings(format!("root element is {}, not {}", name, ROOT)));
                    }
                    saw_root = true;
                }
                Event::Text(t) => {
                    if let Some(name) = &current {
                        let value = t.unescape().map_err(settings_error)?;
                        settings.set(name, value.trim())?;
                    }
                }
                Event::CData(t) => {
                    if let Some(name) = &current {
                        let value = String::from_utf8_lossy(&t.into_inner()).into_owned();
                        settings.set(name, value.trim())?;
                    }
                }
                Event::End(_) => current = None,
                Event::Eof => break,
                _ => {}
            }
        }
        if !saw_root {
            return Err(TransformError::Settings(format!("no {} element", ROOT)));
        }
        Ok(settings)
    }

    fn set(&mut self, element: &str, value: &str) -> Result<()> {
        match element {
            "jdbc" => self.jdbc = value.to_string(),
            "user" => self.user = value.to_string(),
            "driver" => self.driver = value.to_string(),
            "outputPath" => self.output_path = value.to_string(),
            "baseUri" => self.base_uri = value.to_string(),
            "format" => {
                self.format = value
                    .parse()
                    .map_err(|_| TransformError::Settings(format!("format '{}' is not an integer", value)))?
            }
            other => debug!("Ignoring unknown settings element {}", other),
        }
        Ok(())
    }

    /// The document as XML text, declaring `encoding`.
    pub fn to_xml(&self, encoding: &str) -> Result<String> {
        let mut writer = Writer::new_with_indent(Vec::new(), b' ', 2);
        writer
            .write_event(Event::Decl(BytesDecl::new("1.0", Some(encoding), Some("no"))))
            .map_err(settings_error)?;
        writer
            .write_event(Event::Comment(BytesText::new(COMMENT)))
            .map_err(settings_error)?;
        writer
            .write_event(Event::Start(BytesStart::new(ROOT)))
            .map_err(settings_error)?;
        let fields = [
            ("jdbc", self.jdbc.clone()),
            ("user", self.user.clone()),
            ("driver", self.driver.clone()),
            ("outputPath", self.output_path.clone()),
            ("baseUri", self.base_uri.clone()),
            ("format", self.format.to_string()),
        ];
        for (name, value) in &fields {
            writer
                .write_event(Event::Start(BytesStart::new(*name)))
                .map_err(settings_error)?;
            writer
                .write_event(Event::Text(BytesText::new(value)))
                .map_err(settings_error)?;
            writer
                .write_event(Event::End(BytesEnd::new(*name)))
                .map_err(settings_error)?;
        }
        writer
            .write_event(Event::End(BytesEnd::new(ROOT)))
            .map_err(settings_error)?;
        let mut text = String::from_utf8(writer.into_inner()).map_err(settings_error)?;
        text.push('\n');
        Ok(text)
    }

    /// Writes the document as UTF-8.
    pub fn save(&self, path: &Path) -> Result<()> {
        self.save_with_encoding(path, "UTF-8")
    }

    /// Writes the document in the encoding named by `label` (any WHATWG label).
    pub fn save_with_encoding(&self, path: &Path, label: &str) -> Result<()> {
        let encoding = Encoding::for_label(label.as_bytes())
            .ok_or_else(|| TransformError::Settings(format!("unknown encoding '{}'", label)))?;
        // UTF-16 labels encode as UTF-8 in encoding_rs, so declare what is actually written
        let encoding = encoding.output_encoding();
        let text = self.to_xml(encoding.name())?;
        let (bytes, _, unmappable) = encoding.encode(&text);
        if unmappable {
            warn!("Some settings characters cannot be written as {}", encoding.name());
        }
        debug!("Saving settings to {} as {}", path.display(), encoding.name());
        std::fs::write(path, &bytes)?;
        Ok(())
    }
}

fn settings_error(e: impl std::fmt::Display) -> TransformError {
    TransformError::Settings(e.to_string())
}
