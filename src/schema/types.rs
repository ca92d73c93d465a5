use crate::error::SchemaError;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::borrow::Borrow;
use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

/// Unique, slash-delimited name of a node in the canonical graph.
///
/// Component nodes are `service/component` or `service/pod/component`, pod group
/// nodes are `service/pod` and service identity nodes are the bare `service`.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct NodeName(String);

impl NodeName {
    pub const MAX_SEGMENTS: usize = 3;

    pub fn new(name: impl Into<String>) -> Result<Self, SchemaError> {
        let name = name.into();
        let segments = name.split('/').count();
        if name.split('/').any(|s| s.trim().is_empty()) {
            return Err(SchemaError::Validation(format!(
                "node name '{}' contains an empty segment",
                name
            )));
        }
        if segments > Self::MAX_SEGMENTS {
            return Err(SchemaError::Validation(format!(
                "node name '{}' has {} segments, at most {} are allowed",
                name,
                segments,
                Self::MAX_SEGMENTS
            )));
        }
        Ok(Self(name))
    }

    pub fn from_segments<'a>(
        segments: impl IntoIterator<Item = &'a str>,
    ) -> Result<Self, SchemaError> {
        Self::new(segments.into_iter().collect::<Vec<_>>().join("/"))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn segments(&self) -> impl Iterator<Item = &str> {
        self.0.split('/')
    }

    /// The component part of the name, used as the default dependency name.
    pub fn last_segment(&self) -> &str {
        self.0.rsplit('/').next().unwrap_or(&self.0)
    }

    pub fn service(&self) -> &str {
        self.0.split('/').next().unwrap_or(&self.0)
    }
}

impl fmt::Display for NodeName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl Borrow<str> for NodeName {
    fn borrow(&self) -> &str {
        &self.0
    }
}

impl TryFrom<String> for NodeName {
    type Error = SchemaError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl From<NodeName> for String {
    fn from(name: NodeName) -> Self {
        name.0
    }
}

/// Transport protocol of a port.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Protocol {
    #[default]
    Tcp,
    Udp,
}

impl Protocol {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Tcp => "tcp",
            Self::Udp => "udp",
        }
    }
}

impl FromStr for Protocol {
    type Err = SchemaError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "tcp" => Ok(Self::Tcp),
            "udp" => Ok(Self::Udp),
            other => Err(SchemaError::Validation(format!(
                "unknown port protocol '{}'",
                other
            ))),
        }
    }
}

/// A container port such as `80/tcp`.
///
/// Accepts `80`, `"80"` and `"80/udp"` on input and always writes `"80/tcp"`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Port {
    pub number: u16,
    pub protocol: Protocol,
}

impl Port {
    pub fn tcp(number: u16) -> Self {
        Self {
            number,
            protocol: Protocol::Tcp,
        }
    }

    fn from_number(number: u64) -> Result<Self, SchemaError> {
        match u16::try_from(number) {
            Ok(n) if n > 0 => Ok(Self::tcp(n)),
            _ => Err(SchemaError::Validation(format!(
                "port {} is out of range",
                number
            ))),
        }
    }
}

impl FromStr for Port {
    type Err = SchemaError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let (number, protocol) = match s.trim().split_once('/') {
            Some((number, protocol)) => (number, protocol.parse()?),
            None => (s.trim(), Protocol::Tcp),
        };
        let number: u64 = number
            .parse()
            .map_err(|_| SchemaError::Validation(format!("invalid port '{}'", s)))?;
        Ok(Self {
            protocol,
            ..Self::from_number(number)?
        })
    }
}

impl fmt::Display for Port {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.number, self.protocol.as_str())
    }
}

impl Serialize for Port {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for Port {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        #[derive(Deserialize)]
        #[serde(untagged)]
        enum RawPort {
            Number(u64),
            Text(String),
        }

        match RawPort::deserialize(deserializer)? {
            RawPort::Number(n) => Port::from_number(n),
            RawPort::Text(s) => s.parse(),
        }
        .map_err(serde::de::Error::custom)
    }
}

/// How many replicas of a node should be created.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScalingPolicy {
    #[serde(default = "default_min_replicas")]
    pub min: u32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max: Option<u32>,
}

fn default_min_replicas() -> u32 {
    1
}

impl Default for ScalingPolicy {
    fn default() -> Self {
        Self {
            min: default_min_replicas(),
            max: None,
        }
    }
}

impl ScalingPolicy {
    pub fn min(min: u32) -> Self {
        Self { min, max: None }
    }
}

/// A volume attached to a component or node.
///
/// `volume-from` and `volumes-from` name another component (V1) or node (V2).
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct VolumeDefinition {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub path: Option<String>,
    #[serde(
        default,
        deserialize_with = "size_as_string",
        skip_serializing_if = "Option::is_none"
    )]
    pub size: Option<String>,
    #[serde(
        rename = "volume-from",
        default,
        skip_serializing_if = "Option::is_none"
    )]
    pub volume_from: Option<String>,
    #[serde(
        rename = "volumes-from",
        default,
        skip_serializing_if = "Option::is_none"
    )]
    pub volumes_from: Option<String>,
    #[serde(
        rename = "volume-path",
        default,
        skip_serializing_if = "Option::is_none"
    )]
    pub volume_path: Option<String>,
}

impl VolumeDefinition {
    /// Names of other nodes this volume is borrowed from.
    pub fn references(&self) -> impl Iterator<Item = &str> {
        self.volume_from
            .iter()
            .chain(self.volumes_from.iter())
            .map(String::as_str)
    }
}

// Sizes are kept verbatim, numeric sizes included; they are only interpreted on expansion.
fn size_as_string<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Option<String>, D::Error> {
    match Option::<serde_json::Value>::deserialize(deserializer)? {
        None | Some(serde_json::Value::Null) => Ok(None),
        Some(serde_json::Value::String(s)) => Ok(Some(s)),
        Some(serde_json::Value::Number(n)) => Ok(Some(n.to_string())),
        Some(other) => Err(serde::de::Error::custom(format!(
            "volume size must be a string or number, found {}",
            other
        ))),
    }
}

/// Environment variables of a container.
///
/// Reads either a JSON object or a list of `KEY=value` strings, writes an object.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "RawEnvironment")]
pub struct Environment(BTreeMap<String, String>);

#[derive(Deserialize)]
#[serde(untagged)]
enum RawEnvironment {
    Map(BTreeMap<String, String>),
    List(Vec<String>),
}

impl TryFrom<RawEnvironment> for Environment {
    type Error = SchemaError;

    fn try_from(raw: RawEnvironment) -> Result<Self, Self::Error> {
        match raw {
            RawEnvironment::Map(map) => Ok(Self(map)),
            RawEnvironment::List(entries) => entries
                .into_iter()
                .map(|entry| match entry.split_once('=') {
                    Some((key, value)) if !key.is_empty() => {
                        Ok((key.to_string(), value.to_string()))
                    }
                    _ => Err(SchemaError::Validation(format!(
                        "environment entry '{}' is not of the form KEY=value",
                        entry
                    ))),
                })
                .collect::<Result<_, _>>()
                .map(Self),
        }
    }
}

impl Environment {
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn get(&self, key: &str) -> Option<&str> {
        self.0.get(key).map(String::as_str)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.0.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }
}

impl FromIterator<(String, String)> for Environment {
    fn from_iter<T: IntoIterator<Item = (String, String)>>(iter: T) -> Self {
        Self(iter.into_iter().collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_node_name_segments() {
        let name = NodeName::new("shop/web/nginx").unwrap();
        assert_eq!(name.service(), "shop");
        assert_eq!(name.last_segment(), "nginx");
        assert_eq!(name.segments().count(), 3);

        assert!(NodeName::new("a/b/c/d").is_err());
        assert!(NodeName::new("a//c").is_err());
        assert!(NodeName::new("").is_err());
        assert_eq!(NodeName::new("shop").unwrap().last_segment(), "shop");
    }

    #[test]
    fn test_port_parsing() {
        assert_eq!("80".parse::<Port>().unwrap(), Port::tcp(80));
        assert_eq!(
            "53/udp".parse::<Port>().unwrap(),
            Port {
                number: 53,
                protocol: Protocol::Udp
            }
        );
        assert!("0".parse::<Port>().is_err());
        assert!("70000/tcp".parse::<Port>().is_err());
        assert!("80/sctp".parse::<Port>().is_err());

        let ports: Vec<Port> = serde_json::from_str(r#"[8080, "80/tcp"]"#).unwrap();
        assert_eq!(ports, vec![Port::tcp(8080), Port::tcp(80)]);
        assert_eq!(serde_json::to_string(&Port::tcp(80)).unwrap(), r#""80/tcp""#);
    }

    #[test]
    fn test_environment_formats() {
        let from_list: Environment = serde_json::from_str(r#"["A=1", "B=x=y"]"#).unwrap();
        assert_eq!(from_list.get("A"), Some("1"));
        assert_eq!(from_list.get("B"), Some("x=y"));

        let from_map: Environment = serde_json::from_str(r#"{"A": "1", "B": "x=y"}"#).unwrap();
        assert_eq!(from_list, from_map);

        assert!(serde_json::from_str::<Environment>(r#"["NOVALUE"]"#).is_err());
    }

    #[test]
    fn test_volume_size_kept_verbatim() {
        let volume: VolumeDefinition =
            serde_json::from_str(r#"{"path": "/data", "size": 5}"#).unwrap();
        assert_eq!(volume.size.as_deref(), Some("5"));
        assert_eq!(volume.references().count(), 0);
    }
}
