//! 选课状态
//!
//! 线上编码为 `0=Pending, 1=Approved, 2=Completed, 3=Rejected`，
//! 解析时同时兼容状态名称字符串。

use serde::de::{self, Visitor};
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;
use std::str::FromStr;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum EnrollmentStatus {
    Pending,
    Approved,
    Completed,
    Rejected,
}

impl EnrollmentStatus {
    pub const ALL: [EnrollmentStatus; 4] = [
        EnrollmentStatus::Pending,
        EnrollmentStatus::Approved,
        EnrollmentStatus::Completed,
        EnrollmentStatus::Rejected,
    ];

    pub fn code(&self) -> u8 {
        match self {
            EnrollmentStatus::Pending => 0,
            EnrollmentStatus::Approved => 1,
            EnrollmentStatus::Completed => 2,
            EnrollmentStatus::Rejected => 3,
        }
    }

    pub fn from_code(code: u64) -> Option<Self> {
        match code {
            0 => Some(EnrollmentStatus::Pending),
            1 => Some(EnrollmentStatus::Approved),
            2 => Some(EnrollmentStatus::Completed),
            3 => Some(EnrollmentStatus::Rejected),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            EnrollmentStatus::Pending => "Pending",
            EnrollmentStatus::Approved => "Approved",
            EnrollmentStatus::Completed => "Completed",
            EnrollmentStatus::Rejected => "Rejected",
        }
    }

    fn from_name(name: &str) -> Option<Self> {
        match name.trim().to_ascii_lowercase().as_str() {
            "pending" => Some(EnrollmentStatus::Pending),
            "approved" => Some(EnrollmentStatus::Approved),
            "completed" => Some(EnrollmentStatus::Completed),
            "rejected" => Some(EnrollmentStatus::Rejected),
            other => other.parse::<u64>().ok().and_then(Self::from_code),
        }
    }
}

impl fmt::Display for EnrollmentStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for EnrollmentStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::from_name(s).ok_or_else(|| format!("unknown enrollment status: {:?}", s))
    }
}

impl Serialize for EnrollmentStatus {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_u8(self.code())
    }
}

struct StatusVisitor;

impl<'de> Visitor<'de> for StatusVisitor {
    type Value = EnrollmentStatus;

    fn expecting(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.write_str("an enrollment status code (0..=3) or status name")
    }

    fn visit_u64<E: de::Error>(self, v: u64) -> Result<Self::Value, E> {
        EnrollmentStatus::from_code(v)
            .ok_or_else(|| E::custom(format!("unknown enrollment status: {}", v)))
    }

    fn visit_i64<E: de::Error>(self, v: i64) -> Result<Self::Value, E> {
        u64::try_from(v)
            .ok()
            .and_then(EnrollmentStatus::from_code)
            .ok_or_else(|| E::custom(format!("unknown enrollment status: {}", v)))
    }

    fn visit_str<E: de::Error>(self, v: &str) -> Result<Self::Value, E> {
        EnrollmentStatus::from_name(v)
            .ok_or_else(|| E::custom(format!("unknown enrollment status: {:?}", v)))
    }
}

impl<'de> Deserialize<'de> for EnrollmentStatus {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        deserializer.deserialize_any(StatusVisitor)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_codes_follow_backend_enumeration() {
        for status in EnrollmentStatus::ALL {
            let json = serde_json::to_string(&status).unwrap();
            assert_eq!(json, status.code().to_string());
            let back: EnrollmentStatus = serde_json::from_str(&json).unwrap();
            assert_eq!(back, status);
        }
    }

    #[test]
    fn test_status_accepts_names() {
        let s: EnrollmentStatus = serde_json::from_str(r#""approved""#).unwrap();
        assert_eq!(s, EnrollmentStatus::Approved);
        assert!(serde_json::from_str::<EnrollmentStatus>("4").is_err());
    }

    #[test]
    fn test_status_parses_from_form_values() {
        assert_eq!("Rejected".parse(), Ok(EnrollmentStatus::Rejected));
        assert_eq!("2".parse(), Ok(EnrollmentStatus::Completed));
        assert!("graded".parse::<EnrollmentStatus>().is_err());
    }
}
