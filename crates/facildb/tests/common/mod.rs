//! Shared fixtures for database-backed tests.
//!
//! Tests run only when `DATABASE_URL` is set (directly or via `.env`);
//! otherwise they print a note and return.

#![allow(dead_code)]

use facildb::prelude::*;

/// Open a connection, or `None` when no database is configured.
pub async fn connect() -> Option<Connection> {
    let config = match DbConfig::from_env() {
        Ok(config) => config,
        Err(_) => {
            eprintln!("DATABASE_URL not set; skipping database test");
            return None;
        }
    };
    Some(
        Connection::connect(&config)
            .await
            .expect("DATABASE_URL is set but the database is unreachable"),
    )
}

/// Uniquely named temporary `publisher`/`book` tables.
///
/// Temporary tables vanish with the session, so a test that panics before
/// [`Bookstore::teardown`] still leaves nothing behind once its connection drops.
pub struct Bookstore {
    pub publisher: String,
    pub book: String,
}

impl Bookstore {
    pub async fn create(conn: &Connection) -> DbResult<Self> {
        let suffix = uuid::Uuid::new_v4().simple().to_string();
        let store = Self {
            publisher: format!("publisher_{}", &suffix[..12]),
            book: format!("book_{}", &suffix[..12]),
        };

        conn.sql(format!(
            "create temporary table {} (
                id bigint not null,
                pub_name varchar(80) not null,
                primary key (id)
            )",
            store.publisher
        ))
        .execute()
        .await?;

        conn.sql(format!(
            "create temporary table {} (
                id bigint not null,
                title varchar(80) not null,
                author varchar(50) not null,
                isbn varchar(15) not null,
                publisher_id bigint not null,
                primary key (id),
                foreign key (publisher_id) references {}(id)
            )",
            store.book, store.publisher
        ))
        .execute()
        .await?;

        Ok(store)
    }

    pub async fn seed(&self, conn: &Connection) -> DbResult<()> {
        for (id, name) in [(1000i64, "Wiley"), (1001, "Addison-Wesley"), (1002, "Acme Books")] {
            conn.insert(&self.publisher)
                .fields("id, pub_name")
                .param(id)
                .param(name)
                .execute()
                .await?;
        }

        let books: [(i64, &'static str, &'static str, &'static str, i64); 5] = [
            (2000, "Linux Bible", "Christopher Negus", "978-1119578888", 1000),
            (2001, "Effective Java 3rd Edition", "Joshua Bloch", "978-0134685991", 1001),
            (2002, "Refactoring", "Martin Fowler", "978-0134757599", 1001),
            (2003, "TCP/IP Illustrated, Volume 1", "Kevin Fall and W. Stevens", "978-0321336316", 1001),
            (2004, "Drawing Cartoons", "John Silver", "965-33245667", 1002),
        ];
        for (id, title, author, isbn, publisher_id) in books {
            conn.insert(&self.book)
                .fields("id, title, author, isbn, publisher_id")
                .param(id)
                .param(title)
                .param(author)
                .param(isbn)
                .param(publisher_id)
                .execute()
                .await?;
        }
        Ok(())
    }

    pub async fn teardown(self, conn: &Connection) -> DbResult<()> {
        conn.sql(format!("drop table if exists {}", self.book)).execute().await?;
        conn.sql(format!("drop table if exists {}", self.publisher))
            .execute()
            .await?;
        Ok(())
    }
}
