use portfolio_site::entities::user::{AuthUser, SignInRequest, SignUpRequest};
use uuid::Uuid;

#[derive(Debug, Clone)]
pub struct TestUser {
    pub id: String,
    pub email: String,
    pub full_name: String,
    pub password: String,
}

impl TestUser {
    pub fn new(email: impl Into<String>) -> Self {
        Self {
            id: Uuid::new_v4().to_string(),
            email: email.into(),
            full_name: "Maud Kusters".to_string(),
            password: "ValidPass123!".to_string(),
        }
    }

    pub fn random() -> Self {
        Self::new(format!("admin-{}@example.com", Uuid::new_v4()))
    }

    pub fn auth_user(&self) -> AuthUser {
        AuthUser {
            id: self.id.clone(),
            email: Some(self.email.clone()),
            full_name: Some(self.full_name.clone()),
        }
    }

    pub fn sign_in(&self) -> SignInRequest {
        SignInRequest {
            email: self.email.clone(),
            password: self.password.clone(),
        }
    }

    pub fn sign_up(&self) -> SignUpRequest {
        SignUpRequest {
            full_name: self.full_name.clone(),
            email: self.email.clone(),
            password: self.password.clone(),
        }
    }
}
