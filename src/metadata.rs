use std::fmt;
use std::ops::Deref;

use super::Error;
use Error::MalformedMetadata;

/// The plural rule of the target language:
/// the number of plural forms and the C expression selecting one for `n`.
///
/// The expression is not evaluated here;
/// it is stored verbatim for the runtime loading the catalog.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct PluralForms {
    count: u32,
    expression: String,
}

impl PluralForms {
    /// Returns `Error::MalformedMetadata` if `count` is zero
    /// or the expression would break the header line it is stored in.
    pub fn new<T: Into<String>>(count: u32, expression: T) -> Result<Self, Error> {
        let expression = expression.into();
        if count == 0 || expression.trim().is_empty() {
            return Err(MalformedMetadata);
        }
        if expression.contains(|c: char| c == '\n' || c == '\r' || c == '\0') {
            return Err(MalformedMetadata);
        }
        Ok(PluralForms { count, expression })
    }

    /// The number of plural forms.
    pub fn count(&self) -> u32 {
        self.count
    }

    /// The plural selection expression.
    pub fn expression(&self) -> &str {
        &self.expression
    }
}

impl fmt::Display for PluralForms {
    fn fmt(&self, fmt: &mut fmt::Formatter) -> fmt::Result {
        write!(fmt, "nplurals={}; plural={};", self.count, self.expression)
    }
}

/// The ordered `Key: Value` fields stored
/// as the translation of the catalog header.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct MetadataMap(Vec<(&'static str, String)>);

impl MetadataMap {
    /// Returns the fields every generated catalog carries.
    pub fn new() -> Self {
        MetadataMap(vec![
            ("MIME-Version", "1.0".to_owned()),
            ("Content-Type", "text/plain; charset=UTF-8".to_owned()),
            ("Content-Transfer-Encoding", "8bit".to_owned()),
        ])
    }

    /// Appends the `Plural-Forms` field.
    pub fn with_plural_forms(mut self, forms: &PluralForms) -> Self {
        self.0.push(("Plural-Forms", forms.to_string()));
        self
    }

    /// Returns the value of the field named `key`.
    pub fn get(&self, key: &str) -> Option<&str> {
        self.0
            .iter()
            .find(|&&(k, _)| k == key)
            .map(|&(_, ref v)| v.as_str())
    }

    /// Returns a string that indicates the character set.
    pub fn charset(&self) -> Option<&str> {
        self.get("Content-Type")
            .and_then(|x| x.split("charset=").nth(1))
    }

    /// Renders the fields as newline separated lines.
    pub fn render(&self) -> String {
        self.0
            .iter()
            .map(|&(k, ref v)| format!("{}: {}", k, v))
            .collect::<Vec<_>>()
            .join("\n")
    }
}

impl Default for MetadataMap {
    fn default() -> Self {
        Self::new()
    }
}

impl Deref for MetadataMap {
    type Target = [(&'static str, String)];
    fn deref(&self) -> &Self::Target {
        &self.0
    }
}

#[test]
fn test_metadatamap_render() {
    let map = MetadataMap::new();
    assert_eq!(map.len(), 3);
    assert_eq!(
        map.render(),
        "MIME-Version: 1.0\n\
         Content-Type: text/plain; charset=UTF-8\n\
         Content-Transfer-Encoding: 8bit"
    );

    let forms = PluralForms::new(2, "n != 1").unwrap();
    let map = map.with_plural_forms(&forms);
    assert_eq!(map.len(), 4);
    assert!(map
        .render()
        .ends_with("8bit\nPlural-Forms: nplurals=2; plural=n != 1;"));
}

#[test]
fn test_metadatamap_charset() {
    let map = MetadataMap::new();
    assert_eq!(map.charset(), Some("UTF-8"));
    assert_eq!(map.get("Plural-Forms"), None);
}

#[test]
fn test_plural_forms_validation() {
    let ru = "(n%10==1 && n%100!=11 ? 0 : n%10>=2 && n%10<=4 && (n%100<10 || n%100>=20) ? 1 : 2)";
    assert_eq!(PluralForms::new(3, ru).unwrap().expression(), ru);
    assert_eq!(PluralForms::new(1, "0").unwrap().count(), 1);

    for &(count, expr) in &[(0, "n != 1"), (2, ""), (2, "n != 1\nX-Evil: 1"), (2, "n\0")] {
        match PluralForms::new(count, expr) {
            Err(MalformedMetadata) => (),
            other => panic!("Expected MalformedMetadata, got {:?}", other),
        }
    }
}
