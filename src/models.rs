use quick_xml::de::DeError;
use serde::Deserialize;
use std::fmt;

/// Structural mirror of a JNLP document, as close to the XML nesting as serde allows.
///
/// The root tag name is not checked. Anything not listed here is skipped.
#[derive(Debug, Default, Deserialize)]
pub struct JnlpDocument {
    #[serde(rename = "@codebase", default)]
    pub codebase: String,
    #[serde(rename = "@href", default)]
    pub href: String,
    #[serde(rename = "information", default)]
    pub information: Vec<Information>,
    #[serde(rename = "resources", default)]
    pub resources: Vec<Resources>,
}

#[derive(Debug, Default, Deserialize)]
pub struct Information {
    #[serde(rename = "title", default)]
    pub titles: Vec<String>,
}

#[derive(Debug, Default, Deserialize)]
pub struct Resources {
    #[serde(rename = "jar", default)]
    pub jars: Vec<Jar>,
}

#[derive(Debug, Default, Deserialize)]
pub struct Jar {
    #[serde(rename = "@href", default)]
    pub href: String,
}

/// Flattened view of a JNLP file: what the downloader actually needs.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Descriptor {
    pub codebase: String,
    pub href: String,
    pub title: String,
    pub jars: Vec<String>,
}

impl Descriptor {
    /// Decodes raw JNLP bytes. Only malformed XML fails; missing elements become empty values.
    pub fn from_bytes(bytes: &[u8]) -> Result<Self, DeError> {
        let document: JnlpDocument = quick_xml::de::from_reader(bytes)?;
        Ok(document.into())
    }
}

impl From<JnlpDocument> for Descriptor {
    fn from(document: JnlpDocument) -> Self {
        // The last title element in the document wins, whichever information block holds it.
        let title = document
            .information
            .into_iter()
            .flat_map(|info| info.titles)
            .last()
            .unwrap_or_default();

        let jars = document
            .resources
            .into_iter()
            .flat_map(|res| res.jars)
            .map(|jar| jar.href)
            .collect();

        Self {
            codebase: document.codebase,
            href: document.href,
            title,
            jars,
        }
    }
}

impl fmt::Display for Descriptor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "'{}' from {} ({} jars)",
            self.title,
            self.codebase,
            self.jars.len()
        )?;
        if !self.href.is_empty() {
            write!(f, " via {}", self.href)?;
        }
        Ok(())
    }
}

/// Where a single jar comes from and what it is called on disk.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DownloadTarget {
    pub url: String,
    pub file_name: String,
}

impl DownloadTarget {
    pub fn resolve(codebase: &str, href: &str) -> Self {
        Self {
            url: resolve_url(codebase, href),
            file_name: jar_file_name(href).to_string(),
        }
    }
}

/// Joins codebase and href with exactly one `/`. No further URL normalization.
pub fn resolve_url(codebase: &str, href: &str) -> String {
    format!(
        "{}/{}",
        codebase.trim_end_matches('/'),
        href.trim_start_matches('/')
    )
}

/// Last path segment of an href.
pub fn jar_file_name(href: &str) -> &str {
    href.rsplit('/').next().unwrap_or(href)
}

#[cfg(test)]
mod tests {
    use super::*;

    const FULL: &str = r#"<?xml version="1.0" encoding="UTF-8"?>
<jnlp spec="1.0+" codebase="http://example.com/app/" href="launch.jnlp" xmlns:ext="urn:example">
  <information>
    <title>Example App</title>
    <vendor>Example</vendor>
    <offline-allowed/>
  </information>
  <security><all-permissions/></security>
  <resources>
    <j2se version="1.8+"/>
    <jar href="lib/main.jar" main="true"/>
    <nativelib href="native.jar"/>
    <jar href="lib/util.jar"/>
  </resources>
  <application-desc main-class="com.example.Main"/>
  <resources os="Windows">
    <jar href="/win/extra.jar"/>
  </resources>
  <ext:unknown attr="x"><jar href="ignored.jar"/></ext:unknown>
</jnlp>"#;

    #[test]
    fn parses_full_descriptor() {
        let d = Descriptor::from_bytes(FULL.as_bytes()).unwrap();
        assert_eq!(d.codebase, "http://example.com/app/");
        assert_eq!(d.href, "launch.jnlp");
        assert_eq!(d.title, "Example App");
        assert_eq!(d.jars, vec!["lib/main.jar", "lib/util.jar", "/win/extra.jar"]);
        assert_eq!(
            d.to_string(),
            "'Example App' from http://example.com/app/ (3 jars) via launch.jnlp"
        );
    }

    #[test]
    fn jar_order_is_independent_of_grouping() {
        let grouped = r#"<jnlp>
            <resources><jar href="a.jar"/><jar href="b.jar"/><jar href="c.jar"/></resources>
        </jnlp>"#;
        let spread = r#"<jnlp>
            <resources><jar href="a.jar"/></resources>
            <resources/>
            <resources><jar href="b.jar"/></resources>
            <resources><jar href="c.jar"/></resources>
        </jnlp>"#;

        let grouped = Descriptor::from_bytes(grouped.as_bytes()).unwrap();
        let spread = Descriptor::from_bytes(spread.as_bytes()).unwrap();
        assert_eq!(grouped.jars, vec!["a.jar", "b.jar", "c.jar"]);
        assert_eq!(spread.jars, grouped.jars);
    }

    #[test]
    fn duplicates_are_kept() {
        let xml = r#"<jnlp><resources><jar href="a.jar"/><jar href="x/a.jar"/><jar href="a.jar"/></resources></jnlp>"#;
        let d = Descriptor::from_bytes(xml.as_bytes()).unwrap();
        assert_eq!(d.jars, vec!["a.jar", "x/a.jar", "a.jar"]);
    }

    #[test]
    fn missing_sections_yield_empty_values() {
        let d = Descriptor::from_bytes(b"<jnlp/>").unwrap();
        assert_eq!(d, Descriptor::default());
        assert!(d.jars.is_empty());

        let d = Descriptor::from_bytes(br#"<jnlp codebase="http://h"><information/></jnlp>"#)
            .unwrap();
        assert_eq!(d.codebase, "http://h");
        assert_eq!(d.title, "");
    }

    #[test]
    fn jar_without_href_is_empty_entry() {
        let d = Descriptor::from_bytes(b"<jnlp><resources><jar/></resources></jnlp>").unwrap();
        assert_eq!(d.jars, vec![String::new()]);
    }

    #[test]
    fn last_titled_information_wins() {
        let xml = r#"<jnlp>
            <information><title>Default</title></information>
            <information locale="fr"><title>Localized</title></information>
            <information os="Linux"><vendor>v</vendor></information>
        </jnlp>"#;
        let d = Descriptor::from_bytes(xml.as_bytes()).unwrap();
        assert_eq!(d.title, "Localized");
    }

    #[test]
    fn repeated_title_keeps_the_last_one() {
        let xml = r#"<jnlp><information><title>A</title><title>B</title></information></jnlp>"#;
        let d = Descriptor::from_bytes(xml.as_bytes()).unwrap();
        assert_eq!(d.title, "B");
    }

    #[test]
    fn title_text_is_trimmed() {
        let xml = "<jnlp><information><title>\n    App\n  </title></information></jnlp>";
        let d = Descriptor::from_bytes(xml.as_bytes()).unwrap();
        assert_eq!(d.title, "App");
    }

    #[test]
    fn malformed_xml_is_rejected() {
        let mismatched = b"<jnlp><information><title>x</information></jnlp>";
        assert!(Descriptor::from_bytes(mismatched).is_err());

        let truncated = b"<jnlp codebase=\"http://h\"><resources><jar href=\"a.jar\"/>";
        assert!(Descriptor::from_bytes(truncated).is_err());
    }

    #[test]
    fn resolve_url_uses_a_single_slash() {
        assert_eq!(resolve_url("http://host/base/", "/a.jar"), "http://host/base/a.jar");
        assert_eq!(resolve_url("http://host/base", "a.jar"), "http://host/base/a.jar");
        assert_eq!(resolve_url("http://host/base/", "a.jar"), "http://host/base/a.jar");
        assert_eq!(resolve_url("http://host/base//", "//a.jar"), "http://host/base/a.jar");
        assert_eq!(resolve_url("", "a.jar"), "/a.jar");
    }

    #[test]
    fn file_name_drops_directories() {
        assert_eq!(jar_file_name("lib/sub/foo.jar"), "foo.jar");
        assert_eq!(jar_file_name("foo.jar"), "foo.jar");
        assert_eq!(jar_file_name("lib/"), "");

        let target = DownloadTarget::resolve("http://x/app", "sub/b.jar");
        assert_eq!(target.url, "http://x/app/sub/b.jar");
        assert_eq!(target.file_name, "b.jar");
    }
}
