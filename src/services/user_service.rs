use crate::models::user::{
    Role, User, UserLoginRequest, UserLoginResponse, UserRegistrationRequest,
};
use crate::utils::error::{AppError, AppResult};
use crate::utils::jwt;
use bcrypt::{hash, verify, DEFAULT_COST};
use sqlx::MySqlPool;
use uuid::Uuid;
use validator::Validate;

#[derive(Clone)]
pub struct UserService {
    pool: MySqlPool,
}

impl UserService {
    pub fn new(pool: MySqlPool) -> Self {
        UserService { pool }
    }

    // Register a new user
    pub async fn register_user(&self, request: UserRegistrationRequest) -> AppResult<String> {
        request.validate()?;

        // Check if email already exists
        let existing_user = sqlx::query("SELECT id FROM users WHERE email = ?")
            .bind(&request.email)
            .fetch_optional(&self.pool)
            .await?;

        if existing_user.is_some() {
            return Err(AppError::Conflict("Email already registered".into()));
        }

        // Hash password
        let hashed_password = hash(request.password.as_bytes(), DEFAULT_COST)
            .map_err(|e| AppError::ValidationError(e.to_string()))?;

        let user_id = Uuid::new_v4().to_string();
        sqlx::query("INSERT INTO users (id, name, email, password, role) VALUES (?, ?, ?, ?, ?)")
            .bind(&user_id)
            .bind(&request.name)
            .bind(&request.email)
            .bind(&hashed_password)
            .bind(Role::User.to_string())
            .execute(&self.pool)
            .await?;

        Ok(user_id)
    }

    // Login user
    pub async fn login_user(&self, request: UserLoginRequest) -> AppResult<UserLoginResponse> {
        let user = sqlx::query_as::<_, User>(
            "SELECT id, name, email, password, role FROM users WHERE email = ?",
        )
        .bind(&request.email)
        .fetch_optional(&self.pool)
        .await?
        .ok_or_else(|| AppError::AuthError("Invalid credentials".into()))?;

        // Verify password
        let password_matches = verify(request.password.as_bytes(), &user.password)
            .map_err(|e| AppError::AuthError(e.to_string()))?;

        if !password_matches {
            return Err(AppError::AuthError("Invalid credentials".into()));
        }

        let role = user
            .role
            .parse::<Role>()
            .map_err(|_| AppError::AuthError("Unknown role".into()))?;

        // Generate JWT token
        let token = jwt::generate_token(&user.id, &user.email, role)
            .map_err(|e| AppError::AuthError(e.to_string()))?;

        Ok(UserLoginResponse {
            token,
            user_id: user.id,
            role,
        })
    }
}
