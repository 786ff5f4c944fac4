#![allow(dead_code)]

use json_guard::{AccessConfig, FieldMetadata, Model, Schema};
use serde_json::{json, Value};

/// A user type with one hidden, one read-only and one private field, an
/// upper-casing getter and a computed `displayName`.
pub fn user_schema() -> Schema {
    Schema::builder()
        .field("name", FieldMetadata::default())
        .field("email", FieldMetadata::default())
        .field("password", FieldMetadata::hidden())
        .field("role", FieldMetadata::read_only())
        .field("auth.token", FieldMetadata::private())
        .getter("country", |v| json!(v.as_str().unwrap_or_default().to_uppercase()))
        .virtual_field("displayName", FieldMetadata::default(), |doc| {
            json!(format!("{} <{}>", doc["name"].as_str().unwrap_or_default(), doc["email"].as_str().unwrap_or_default()))
        })
        .build()
}

pub fn user_model() -> Model {
    Model::register("User", user_schema(), &AccessConfig::default())
}

pub fn user(id: &str) -> Value {
    json!({
        "_id": id,
        "__v": 0,
        "name": "Ada",
        "email": "ada@example.org",
        "password": "hash",
        "role": "user",
        "country": "no",
        "auth": {"token": "t0k3n", "kind": "local"},
        "address": {"city": "Oslo", "zip": "0150"},
        "tags": ["a", "b"]
    })
}
