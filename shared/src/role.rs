//! 角色模型
//!
//! 后端不同模块对角色的编码并不统一：认证接口返回 `"Admin"` 这样的字符串，
//! 管理接口返回 `0/1/2` 数字，个别接口甚至返回 `"0"` 这样的数字字符串。
//! 这里是唯一的解析边界，所有表示在此统一为封闭的 [`Role`] 枚举，向内不再传播歧义。

use serde::de::{self, Visitor};
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;
use std::str::FromStr;

/// 用户角色（封闭枚举）
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Role {
    Admin,
    Teacher,
    Student,
}

impl Role {
    pub const ALL: [Role; 3] = [Role::Admin, Role::Teacher, Role::Student];

    /// 字符串形式（认证接口使用）
    pub fn as_str(&self) -> &'static str {
        match self {
            Role::Admin => "Admin",
            Role::Teacher => "Teacher",
            Role::Student => "Student",
        }
    }

    /// 数字形式（管理接口使用）
    pub fn code(&self) -> u8 {
        match self {
            Role::Admin => 0,
            Role::Teacher => 1,
            Role::Student => 2,
        }
    }

    pub fn from_code(code: u64) -> Option<Self> {
        match code {
            0 => Some(Role::Admin),
            1 => Some(Role::Teacher),
            2 => Some(Role::Student),
            _ => None,
        }
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// 无法识别的角色表示
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UnknownRole(pub String);

impl fmt::Display for UnknownRole {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "unknown role: {:?}", self.0)
    }
}

impl std::error::Error for UnknownRole {}

impl FromStr for Role {
    type Err = UnknownRole;

    /// 接受名称（大小写不敏感）或数字字符串
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let trimmed = s.trim();
        if let Ok(code) = trimmed.parse::<u64>() {
            return Role::from_code(code).ok_or_else(|| UnknownRole(s.to_string()));
        }
        match trimmed.to_ascii_lowercase().as_str() {
            "admin" => Ok(Role::Admin),
            "teacher" => Ok(Role::Teacher),
            "student" => Ok(Role::Student),
            _ => Err(UnknownRole(s.to_string())),
        }
    }
}

impl Serialize for Role {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.as_str())
    }
}

struct RoleVisitor;

impl<'de> Visitor<'de> for RoleVisitor {
    type Value = Role;

    fn expecting(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.write_str("a role name or a numeric role code (0=Admin, 1=Teacher, 2=Student)")
    }

    fn visit_u64<E: de::Error>(self, v: u64) -> Result<Role, E> {
        Role::from_code(v).ok_or_else(|| E::custom(UnknownRole(v.to_string())))
    }

    fn visit_i64<E: de::Error>(self, v: i64) -> Result<Role, E> {
        u64::try_from(v)
            .ok()
            .and_then(Role::from_code)
            .ok_or_else(|| E::custom(UnknownRole(v.to_string())))
    }

    fn visit_str<E: de::Error>(self, v: &str) -> Result<Role, E> {
        v.parse().map_err(E::custom)
    }
}

impl<'de> Deserialize<'de> for Role {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        deserializer.deserialize_any(RoleVisitor)
    }
}

/// 以数字编码序列化的角色，仅用于管理端的角色变更请求
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RoleCode(pub Role);

impl Serialize for RoleCode {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_u8(self.0.code())
    }
}

impl<'de> Deserialize<'de> for RoleCode {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        Role::deserialize(deserializer).map(RoleCode)
    }
}

impl From<Role> for RoleCode {
    fn from(role: Role) -> Self {
        RoleCode(role)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_role_accepts_every_wire_form() {
        let cases = [
            (r#""Admin""#, Role::Admin),
            (r#""teacher""#, Role::Teacher),
            (r#""STUDENT""#, Role::Student),
            ("0", Role::Admin),
            ("1", Role::Teacher),
            ("2", Role::Student),
            (r#""0""#, Role::Admin),
            (r#""2""#, Role::Student),
        ];
        for (json, expected) in cases {
            let role: Role = serde_json::from_str(json).unwrap();
            assert_eq!(role, expected, "input {}", json);
        }
    }

    #[test]
    fn test_unknown_role_is_rejected() {
        for json in [r#""Superuser""#, "3", "-1", r#""""#, "null"] {
            assert!(serde_json::from_str::<Role>(json).is_err(), "input {}", json);
        }
    }

    #[test]
    fn test_role_code_serializes_numeric() {
        assert_eq!(serde_json::to_string(&RoleCode(Role::Teacher)).unwrap(), "1");
        assert_eq!(serde_json::to_string(&Role::Teacher).unwrap(), r#""Teacher""#);
    }
}
