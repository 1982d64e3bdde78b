use thiserror::Error;

/// A random 128-bit identifier for a model build. It renders as 32 lowercase hex digits.
#[derive(Debug, Copy, Clone, Eq, PartialEq, Ord, PartialOrd, Hash)]
pub struct Id(u128);

impl Id {
	pub fn new() -> Self {
		Self::default()
	}
}

impl Default for Id {
	fn default() -> Self {
		Self(rand::random())
	}
}

#[derive(Debug, Error, PartialEq)]
#[error("\"{0}\" is not a valid model id, which must be 32 hex digits")]
pub struct ParseIdError(String);

impl std::str::FromStr for Id {
	type Err = ParseIdError;

	fn from_str(text: &str) -> Result<Self, ParseIdError> {
		let is_hex = text.len() == 32 && text.bytes().all(|byte| byte.is_ascii_hexdigit());
		if !is_hex {
			return Err(ParseIdError(text.to_owned()));
		}
		u128::from_str_radix(text, 16)
			.map(Id)
			.map_err(|_| ParseIdError(text.to_owned()))
	}
}

impl std::fmt::Display for Id {
	fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
		write!(f, "{:032x}", self.0)
	}
}

// Model records store ids as their hex text.
impl serde::Serialize for Id {
	fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
		serializer.collect_str(self)
	}
}

impl<'de> serde::Deserialize<'de> for Id {
	fn deserialize<D: serde::Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
		let text = <String as serde::Deserialize>::deserialize(deserializer)?;
		text.parse().map_err(serde::de::Error::custom)
	}
}

#[test]
fn test_parse_model_ids() {
	let id: Id = "f51a3a61ee9d4731b1b06c816a8ab856".parse().unwrap();
	assert_eq!(id.to_string(), "f51a3a61ee9d4731b1b06c816a8ab856");
	let id: Id = "00000000000000000000000000000007".parse().unwrap();
	assert_eq!(id, Id(7));
	assert_eq!(
		"+0000000000000000000000000000007".parse::<Id>(),
		Err(ParseIdError("+0000000000000000000000000000007".to_owned()))
	);
	assert!("f51a3a61".parse::<Id>().is_err());
	assert!("0000000000000000000000000000000z".parse::<Id>().is_err());
}

#[test]
fn test_id_serializes_as_text() {
	let id: Id = "0123456789abcdef0123456789abcdef".parse().unwrap();
	let json = serde_json::to_string(&id).unwrap();
	assert_eq!(json, "\"0123456789abcdef0123456789abcdef\"");
	assert_eq!(serde_json::from_str::<Id>(&json).unwrap(), id);
	assert!(serde_json::from_str::<Id>("\"model\"").is_err());
}

#[test]
fn test_ids_differ() {
	assert_ne!(Id::new(), Id::new());
}
