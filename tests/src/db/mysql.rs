use mysql_async::prelude::*;
use tabula::driver::{Capability, Driver};
use tabula::{Connect, Error};
use url::Url;

use crate::{isolation::TestIsolation, Setup};

pub struct SetupMySQL {
    isolation: TestIsolation,
}

impl SetupMySQL {
    pub fn new() -> Self {
        Self {
            isolation: TestIsolation::new(),
        }
    }
}

impl Default for SetupMySQL {
    fn default() -> Self {
        Self::new()
    }
}

fn base_url() -> String {
    std::env::var("TABULA_TEST_MYSQL_URL")
        .unwrap_or_else(|_| "mysql://localhost:3306/tabula_test".to_string())
}

/// Runs `sql` on the server of the base URL.
async fn admin(sql: String) -> tabula::Result<()> {
    let mut conn = mysql_async::Conn::from_url(base_url())
        .await
        .map_err(Error::driver)?;

    conn.query_drop(sql).await.map_err(Error::driver)?;
    conn.disconnect().await.map_err(Error::driver)
}

#[async_trait::async_trait]
impl Setup for SetupMySQL {
    async fn connect(&self) -> tabula::Result<Box<dyn Driver>> {
        let database = self.isolation.database_name();
        admin(format!("CREATE DATABASE IF NOT EXISTS `{database}`")).await?;

        let mut url = Url::parse(&base_url()).map_err(Error::driver)?;
        url.set_path(&database);

        Ok(Box::new(Connect::new(url.as_str())?))
    }

    fn capability(&self) -> &'static Capability {
        &Capability::MYSQL
    }

    async fn cleanup(&self) -> tabula::Result<()> {
        let database = self.isolation.database_name();
        admin(format!("DROP DATABASE IF EXISTS `{database}`")).await
    }
}
