//! [`Command`] for creating a new [`User`].

use common::{
    operations::{By, Commit, Insert, Select, Transact, Transacted},
    DateTime,
};
use derive_more::{Display, Error, From};
use secrecy::{ExposeSecret, SecretBox};
use tracerr::Traced;

#[cfg(doc)]
use crate::domain::user::{Email, Login, Name, Password};
use crate::{
    domain::{city, user, User},
    infra::{database, Database},
    Service,
};

use super::Command;

/// [`Command`] for creating a new [`User`].
///
/// New [`User`]s always start as unverified [`user::Role::Customer`]s; admin
/// accounts are provisioned separately.
#[derive(Clone, Debug)]
pub struct CreateUser {
    /// [`Name`] of a new [`User`].
    pub name: user::Name,

    /// [`Login`] of a new [`User`].
    pub login: user::Login,

    /// [`Password`] of a new [`User`].
    pub password: SecretBox<user::Password>,

    /// [`Email`] of a new [`User`].
    pub email: Option<user::Email>,

    /// ID of the home city of a new [`User`].
    pub city_id: Option<city::Id>,
}

impl<Db> Command<CreateUser> for Service<Db>
where
    Db: for<'l> Database<
            Select<By<Option<User>, &'l user::Login>>,
            Ok = Option<User>,
            Err = Traced<database::Error>,
        > + Database<Transact, Err = Traced<database::Error>>,
    Transacted<Db>: Database<Insert<User>, Err = Traced<database::Error>>
        + Database<Commit, Err = Traced<database::Error>>,
{
    type Ok = User;
    type Err = Traced<ExecutionError>;

    async fn execute(&self, cmd: CreateUser) -> Result<Self::Ok, Self::Err> {
        use ExecutionError as E;

        let CreateUser {
            name,
            login,
            password,
            email,
            city_id,
        } = cmd;

        let u = self
            .database()
            .execute(Select(By::new(&login)))
            .await
            .map_err(tracerr::map_from_and_wrap!(=> E))?;
        if u.is_some() {
            return Err(tracerr::new!(E::LoginOccupied(login)));
        }

        let user = User {
            id: user::Id::new(),
            name,
            login,
            password_hash: user::PasswordHash::new(password.expose_secret()),
            email,
            role: user::Role::Customer,
            is_verified: false,
            city_id,
            created_at: DateTime::now().coerce(),
        };

        let tx = self
            .database()
            .execute(Transact)
            .await
            .map_err(tracerr::map_from_and_wrap!(=> E))?;
        tx.execute(Insert(user.clone()))
            .await
            .map_err(tracerr::map_from_and_wrap!(=> E))
            .map(drop)?;
        tx.execute(Commit)
            .await
            .map_err(tracerr::map_from_and_wrap!(=> E))
            .map(drop)?;

        Ok(user)
    }
}

/// Error of [`CreateUser`] [`Command`] execution.
#[derive(Debug, Display, Error, From)]
pub enum ExecutionError {
    /// [`Database`] error.
    #[display("`Database` operation failed: {_0}")]
    #[from]
    Db(database::Error),

    /// [`user::Login`] is already occupied.
    #[display("`{_0}` login is occupied")]
    LoginOccupied(#[error(not(source))] user::Login),
}

#[cfg(test)]
mod spec {
    use secrecy::SecretBox;

    use crate::{
        domain::user::{Login, Name, Password, Role},
        fixture, Command as _,
    };

    use super::{CreateUser, ExecutionError as E};

    fn cmd(login: &str) -> CreateUser {
        CreateUser {
            name: Name::new("John Doe").unwrap(),
            login: Login::new(login).unwrap(),
            password: SecretBox::new(Box::new(Password::from("qwerty123"))),
            email: None,
            city_id: None,
        }
    }

    #[tokio::test]
    async fn creates_unverified_customer() {
        let svc = fixture::service();

        let user = svc.execute(cmd("johndoe")).await.unwrap();

        assert_eq!(user.role, Role::Customer);
        assert!(!user.is_verified);
    }

    #[tokio::test]
    async fn rejects_occupied_login() {
        let svc = fixture::service();
        drop(svc.execute(cmd("johndoe")).await.unwrap());

        let res = svc.execute(cmd("johndoe")).await;
        assert!(matches!(fixture::err_of(res), E::LoginOccupied(_)));
    }
}
