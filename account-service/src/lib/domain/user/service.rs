use std::sync::Arc;

use async_trait::async_trait;

use crate::domain::user::models::CreateUserCommand;
use crate::domain::user::models::EmailAddress;
use crate::domain::user::models::UpdateUserCommand;
use crate::domain::user::models::User;
use crate::domain::user::models::UserId;
use crate::user::errors::UserError;
use crate::user::ports::UserRepository;
use crate::user::ports::UserServicePort;

/// Domain service implementation for user operations.
///
/// Concrete implementation of UserServicePort with dependency injection.
pub struct UserService<UR>
where
    UR: UserRepository,
{
    repository: Arc<UR>,
    password_hasher: auth::PasswordHasher,
}

impl<UR> UserService<UR>
where
    UR: UserRepository,
{
    /// Create a new user service with injected dependencies.
    ///
    /// # Arguments
    /// * `repository` - User persistence implementation
    ///
    /// # Returns
    /// Configured user service instance
    pub fn new(repository: Arc<UR>) -> Self {
        Self {
            repository,
            password_hasher: auth::PasswordHasher::new(),
        }
    }
}

#[async_trait]
impl<UR> UserServicePort for UserService<UR>
where
    UR: UserRepository,
{
    async fn create_user(&self, command: CreateUserCommand) -> Result<User, UserError> {
        // Hash password using auth library; the plaintext never reaches storage
        let password_hash = self
            .password_hasher
            .hash(&command.password)
            .map_err(|e| UserError::PasswordHashing(e.to_string()))?;

        self.repository.create(&command, &password_hash).await
    }

    async fn get_user(&self, id: &UserId) -> Result<User, UserError> {
        self.repository
            .find_by_id(id)
            .await?
            .ok_or(UserError::NotFound(id.to_string()))
    }

    async fn get_user_by_email(&self, email: &EmailAddress) -> Result<User, UserError> {
        self.repository
            .find_by_email(email)
            .await?
            .ok_or(UserError::NotFoundByEmail(email.as_str().to_string()))
    }

    async fn list_users(&self) -> Result<Vec<User>, UserError> {
        self.repository.list_all().await
    }

    async fn update_user(
        &self,
        id: &UserId,
        command: UpdateUserCommand,
    ) -> Result<User, UserError> {
        let mut user = self
            .repository
            .find_by_id(id)
            .await?
            .ok_or(UserError::NotFound(id.to_string()))?;

        if let Some(new_first_name) = command.first_name {
            user.first_name = new_first_name;
        }

        if let Some(new_last_name) = command.last_name {
            user.last_name = new_last_name;
        }

        if let Some(new_email) = command.email {
            user.email = new_email;
        }

        if let Some(new_is_admin) = command.is_admin {
            user.is_admin = new_is_admin;
        }

        if let Some(new_password) = command.password {
            user.password_hash = self
                .password_hasher
                .hash(&new_password)
                .map_err(|e| UserError::PasswordHashing(e.to_string()))?;
        }

        self.repository.update(user).await
    }

    async fn delete_user(&self, id: &UserId) -> Result<(), UserError> {
        self.repository.delete(id).await
    }
}

#[cfg(test)]
mod tests {
    use chrono::Utc;
    use mockall::mock;
    use mockall::predicate::*;

    use super::*;
    use crate::domain::user::models::EmailAddress;

    // Define mocks in the test module using mockall
    mock! {
        pub TestUserRepository {}

        #[async_trait]
        impl UserRepository for TestUserRepository {
            async fn create(&self, command: &CreateUserCommand, password_hash: &str) -> Result<User, UserError>;
            async fn find_by_id(&self, id: &UserId) -> Result<Option<User>, UserError>;
            async fn find_by_email(&self, email: &EmailAddress) -> Result<Option<User>, UserError>;
            async fn list_all(&self) -> Result<Vec<User>, UserError>;
            async fn update(&self, user: User) -> Result<User, UserError>;
            async fn delete(&self, id: &UserId) -> Result<(), UserError>;
        }
    }

    fn sample_user(id: i64) -> User {
        User {
            id: UserId(id),
            first_name: "Ada".to_string(),
            last_name: "Lovelace".to_string(),
            email: EmailAddress::new(format!("ada{}@example.com", id)).unwrap(),
            is_admin: false,
            password_hash: "$argon2id$test_hash".to_string(),
            created_at: Utc::now(),
        }
    }

    #[tokio::test]
    async fn test_create_user_hashes_password() {
        let mut repository = MockTestUserRepository::new();

        repository
            .expect_create()
            .withf(|command, password_hash| {
                command.first_name == "Ada"
                    && command.email.as_str() == "ada@example.com"
                    && password_hash.starts_with("$argon2")
            })
            .times(1)
            .returning(|command, password_hash| {
                Ok(User {
                    id: UserId(1),
                    first_name: command.first_name.clone(),
                    last_name: command.last_name.clone(),
                    email: command.email.clone(),
                    is_admin: command.is_admin,
                    password_hash: password_hash.to_string(),
                    created_at: Utc::now(),
                })
            });

        let service = UserService::new(Arc::new(repository));

        let command = CreateUserCommand {
            first_name: "Ada".to_string(),
            last_name: "Lovelace".to_string(),
            email: EmailAddress::new("ada@example.com".to_string()).unwrap(),
            is_admin: false,
            password: "password123".to_string(),
        };

        let user = service.create_user(command).await.unwrap();
        assert_eq!(user.first_name, "Ada");
        assert_eq!(user.email.as_str(), "ada@example.com");
        // Password is hashed with real Argon2, plaintext is gone
        assert!(user.password_hash.starts_with("$argon2"));
        assert_ne!(user.password_hash, "password123");
    }

    #[tokio::test]
    async fn test_create_user_duplicate_email() {
        let mut repository = MockTestUserRepository::new();

        repository.expect_create().times(1).returning(|command, _| {
            Err(UserError::EmailAlreadyExists(
                command.email.as_str().to_string(),
            ))
        });

        let service = UserService::new(Arc::new(repository));

        let command = CreateUserCommand {
            first_name: "Ada".to_string(),
            last_name: "Lovelace".to_string(),
            email: EmailAddress::new("ada@example.com".to_string()).unwrap(),
            is_admin: false,
            password: "password123".to_string(),
        };

        let result = service.create_user(command).await;
        assert!(matches!(
            result.unwrap_err(),
            UserError::EmailAlreadyExists(_)
        ));
    }

    #[tokio::test]
    async fn test_get_user_success() {
        let mut repository = MockTestUserRepository::new();

        let expected_user = sample_user(7);
        let returned_user = expected_user.clone();
        repository
            .expect_find_by_id()
            .withf(|id| id.0 == 7)
            .times(1)
            .returning(move |_| Ok(Some(returned_user.clone())));

        let service = UserService::new(Arc::new(repository));

        let user = service.get_user(&UserId(7)).await.unwrap();
        assert_eq!(user.id, UserId(7));
        assert_eq!(user.first_name, "Ada");
    }

    #[tokio::test]
    async fn test_get_user_not_found() {
        let mut repository = MockTestUserRepository::new();

        repository
            .expect_find_by_id()
            .times(1)
            .returning(|_| Ok(None));

        let service = UserService::new(Arc::new(repository));

        let result = service.get_user(&UserId(404)).await;
        assert!(matches!(result.unwrap_err(), UserError::NotFound(_)));
    }

    #[tokio::test]
    async fn test_get_user_by_email_success() {
        let mut repository = MockTestUserRepository::new();

        let expected_user = sample_user(3);
        let returned_user = expected_user.clone();
        repository
            .expect_find_by_email()
            .withf(|email| email.as_str() == "ada3@example.com")
            .times(1)
            .returning(move |_| Ok(Some(returned_user.clone())));

        let service = UserService::new(Arc::new(repository));

        let email = EmailAddress::new("ada3@example.com".to_string()).unwrap();
        let user = service.get_user_by_email(&email).await.unwrap();
        assert_eq!(user.id, UserId(3));
    }

    #[tokio::test]
    async fn test_get_user_by_email_not_found() {
        let mut repository = MockTestUserRepository::new();

        repository
            .expect_find_by_email()
            .times(1)
            .returning(|_| Ok(None));

        let service = UserService::new(Arc::new(repository));

        let email = EmailAddress::new("nobody@example.com".to_string()).unwrap();
        let result = service.get_user_by_email(&email).await;
        assert!(matches!(result.unwrap_err(), UserError::NotFoundByEmail(_)));
    }

    #[tokio::test]
    async fn test_list_users() {
        let mut repository = MockTestUserRepository::new();

        let users = vec![sample_user(1), sample_user(2)];
        let returned_users = users.clone();
        repository
            .expect_list_all()
            .times(1)
            .returning(move || Ok(returned_users.clone()));

        let service = UserService::new(Arc::new(repository));

        let result = service.list_users().await.unwrap();
        assert_eq!(result.len(), 2);
    }

    #[tokio::test]
    async fn test_update_user_success() {
        let mut repository = MockTestUserRepository::new();

        let existing_user = sample_user(5);
        let returned_user = existing_user.clone();
        repository
            .expect_find_by_id()
            .withf(|id| id.0 == 5)
            .times(1)
            .returning(move |_| Ok(Some(returned_user.clone())));

        repository
            .expect_update()
            .withf(|user| {
                user.first_name == "Grace"
                    && user.email.as_str() == "grace@example.com"
                    && user.is_admin
                    && user.password_hash.starts_with("$argon2")
            })
            .times(1)
            .returning(|user| Ok(user));

        let service = UserService::new(Arc::new(repository));

        let command = UpdateUserCommand {
            first_name: Some("Grace".to_string()),
            last_name: Some("Hopper".to_string()),
            email: Some(EmailAddress::new("grace@example.com".to_string()).unwrap()),
            is_admin: Some(true),
            password: Some("newpassword".to_string()),
        };

        let updated = service.update_user(&UserId(5), command).await.unwrap();
        assert_eq!(updated.first_name, "Grace");
        assert_eq!(updated.email.as_str(), "grace@example.com");
        assert!(updated.is_admin);
    }

    #[tokio::test]
    async fn test_update_user_partial_fields_only() {
        let mut repository = MockTestUserRepository::new();

        let existing_user = sample_user(5);
        let original_hash = existing_user.password_hash.clone();
        let returned_user = existing_user.clone();
        repository
            .expect_find_by_id()
            .times(1)
            .returning(move |_| Ok(Some(returned_user.clone())));

        let expected_hash = original_hash.clone();
        repository
            .expect_update()
            .withf(move |user| {
                // Only email changes; everything else keeps its stored value
                user.email.as_str() == "new@example.com"
                    && user.first_name == "Ada"
                    && user.last_name == "Lovelace"
                    && !user.is_admin
                    && user.password_hash == expected_hash
            })
            .times(1)
            .returning(|user| Ok(user));

        let service = UserService::new(Arc::new(repository));

        let command = UpdateUserCommand {
            first_name: None,
            last_name: None,
            email: Some(EmailAddress::new("new@example.com".to_string()).unwrap()),
            is_admin: None,
            password: None,
        };

        let updated = service.update_user(&UserId(5), command).await.unwrap();
        assert_eq!(updated.email.as_str(), "new@example.com");
        assert_eq!(updated.first_name, "Ada");
    }

    #[tokio::test]
    async fn test_update_user_not_found() {
        let mut repository = MockTestUserRepository::new();

        repository
            .expect_find_by_id()
            .times(1)
            .returning(|_| Ok(None));

        let service = UserService::new(Arc::new(repository));

        let command = UpdateUserCommand {
            first_name: Some("Grace".to_string()),
            last_name: None,
            email: None,
            is_admin: None,
            password: None,
        };

        let result = service.update_user(&UserId(404), command).await;
        assert!(matches!(result.unwrap_err(), UserError::NotFound(_)));
    }

    #[tokio::test]
    async fn test_delete_user_success() {
        let mut repository = MockTestUserRepository::new();

        repository
            .expect_delete()
            .withf(|id| id.0 == 9)
            .times(1)
            .returning(|_| Ok(()));

        let service = UserService::new(Arc::new(repository));

        assert!(service.delete_user(&UserId(9)).await.is_ok());
    }

    #[tokio::test]
    async fn test_delete_user_not_found() {
        let mut repository = MockTestUserRepository::new();

        repository
            .expect_delete()
            .times(1)
            .returning(|id| Err(UserError::NotFound(id.to_string())));

        let service = UserService::new(Arc::new(repository));

        let result = service.delete_user(&UserId(404)).await;
        assert!(matches!(result.unwrap_err(), UserError::NotFound(_)));
    }
}
