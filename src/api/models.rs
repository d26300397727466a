use serde::Serialize;

#[derive(Serialize)]
pub struct LoginRequest<'a> {
    pub username: &'a str,
    pub password: &'a str,
}

#[derive(Serialize)]
pub struct RefreshRequest<'a> {
    pub refresh: &'a str,
}
