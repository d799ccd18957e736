use std::fmt;

use serde::de::{DeserializeOwned, IgnoredAny, MapAccess, Visitor};
use serde::{Deserialize, Deserializer};

use userbase_core::{Entity, User, UserPatch};

// -------------------------
// Request DTOs
// -------------------------
//
// Field names follow the `User` JSON shape (`Name`, `Birthday`) but are
// matched case-insensitively; when a field appears more than once the last
// occurrence wins. Unknown fields (including `ID`) are ignored.

#[derive(Debug, Default, Deserialize)]
#[serde(from = "UserFields")]
pub struct CreateUserRequest {
    pub name: Option<String>,
    pub birthday: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(from = "UserFields")]
pub struct UpdateUserRequest {
    pub name: Option<String>,
    pub birthday: Option<String>,
}

impl From<UserFields> for CreateUserRequest {
    fn from(fields: UserFields) -> Self {
        Self {
            name: fields.name,
            birthday: fields.birthday,
        }
    }
}

impl From<UserFields> for UpdateUserRequest {
    fn from(fields: UserFields) -> Self {
        Self {
            name: fields.name,
            birthday: fields.birthday,
        }
    }
}

impl From<UpdateUserRequest> for UserPatch {
    fn from(body: UpdateUserRequest) -> Self {
        UserPatch {
            name: body.name,
            birthday: body.birthday,
        }
    }
}

/// Wire form shared by both request bodies.
#[derive(Debug, Default)]
struct UserFields {
    name: Option<String>,
    birthday: Option<String>,
}

impl<'de> Deserialize<'de> for UserFields {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        deserializer.deserialize_map(UserFieldsVisitor)
    }
}

struct UserFieldsVisitor;

impl<'de> Visitor<'de> for UserFieldsVisitor {
    type Value = UserFields;

    fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("a JSON object with Name and Birthday")
    }

    fn visit_map<A>(self, mut map: A) -> Result<Self::Value, A::Error>
    where
        A: MapAccess<'de>,
    {
        let mut fields = UserFields::default();
        while let Some(key) = map.next_key::<String>()? {
            let slot = if key.eq_ignore_ascii_case("name") {
                &mut fields.name
            } else if key.eq_ignore_ascii_case("birthday") {
                &mut fields.birthday
            } else {
                map.next_value::<IgnoredAny>()?;
                continue;
            };
            // `null` leaves whatever an earlier occurrence set.
            if let Some(value) = map.next_value::<Option<String>>()? {
                *slot = Some(value);
            }
        }
        Ok(fields)
    }
}

/// Decode a JSON request body.
///
/// An empty (or all-whitespace) body and a bare `null` both decode as
/// `T::default()`, i.e. a request that carries no fields. The `Content-Type`
/// header is not checked.
pub fn parse_body<T>(bytes: &[u8]) -> Result<T, serde_json::Error>
where
    T: DeserializeOwned + Default,
{
    if bytes.iter().all(u8::is_ascii_whitespace) {
        return Ok(T::default());
    }
    serde_json::from_slice::<Option<T>>(bytes).map(Option::unwrap_or_default)
}

// -------------------------
// JSON mapping helpers
// -------------------------

pub fn user_to_json(user: &User) -> serde_json::Value {
    serde_json::json!({
        "ID": user.id().as_i64(),
        "Name": user.name(),
        "Birthday": user.birthday(),
    })
}

pub fn users_to_json(users: &[User]) -> serde_json::Value {
    serde_json::Value::Array(users.iter().map(user_to_json).collect())
}
