use std::collections::HashMap;
use std::path::Path;
use std::time::Instant;

use chrono::{NaiveDate, Utc};
use log::{debug, error, info};
use rusqlite::types::Value;
use rusqlite::{
    params, params_from_iter, Connection, OptionalExtension, Row, ToSql, Transaction,
    TransactionBehavior,
};

use stashdb_core::{
    attachment::{Alias, AttachmentKind, BodyModKind, BodyModification, Url},
    ids::{PerformerId, SceneId},
    performer::{Gender, Performer},
};

use crate::config::StorageConfig;
use crate::error::StorageError;
use crate::filter::{compile_age, compile_birth_year, DateRangeFilter};
use crate::traits::{
    PerformerFilter, PerformerPage, PerformerRepository, PerformerSort, QuerySpec, SortDirection,
};

const PERFORMER_COLUMNS: &str = "performers.id, performers.name, performers.disambiguation, \
    performers.gender, performers.birthdate, performers.ethnicity, performers.country, \
    performers.eye_color, performers.hair_color, performers.height, \
    performers.career_start_year, performers.career_end_year, performers.deleted, \
    performers.created_at, performers.updated_at";

/// Convert Vec<u8> to fixed-size array with proper error handling.
fn to_array<const N: usize>(v: Vec<u8>, label: &str) -> Result<[u8; N], StorageError> {
    v.try_into()
        .map_err(|_| StorageError::InvalidData(format!("invalid {label} length")))
}

pub struct SqliteStorage {
    conn: Connection,
}

impl SqliteStorage {
    pub fn open(path: impl AsRef<Path>) -> Result<Self, StorageError> {
        Self::open_with(&StorageConfig::file(path.as_ref()))
    }

    pub fn open_in_memory() -> Result<Self, StorageError> {
        Self::open_with(&StorageConfig::default())
    }

    pub fn open_with(config: &StorageConfig) -> Result<Self, StorageError> {
        let started_at = Instant::now();
        let mode = if config.path.is_some() { "file" } else { "memory" };
        info!("event=db_open module=storage status=start mode={mode}");

        let opened = match &config.path {
            Some(path) => Connection::open(path),
            None => Connection::open_in_memory(),
        };
        let conn = match opened {
            Ok(conn) => conn,
            Err(err) => {
                error!(
                    "event=db_open module=storage status=error mode={mode} duration_ms={} error={err}",
                    started_at.elapsed().as_millis()
                );
                return Err(err.into());
            }
        };

        if let Err(err) = crate::schema::init_schema(&conn, config) {
            error!(
                "event=db_open module=storage status=error mode={mode} duration_ms={} error={err}",
                started_at.elapsed().as_millis()
            );
            return Err(err);
        }

        info!(
            "event=db_open module=storage status=ok mode={mode} duration_ms={}",
            started_at.elapsed().as_millis()
        );
        Ok(Self { conn })
    }

    /// Repository over the connection in autocommit mode.
    pub fn repository(&self) -> SqliteRepository<'_> {
        SqliteRepository::new(&self.conn)
    }

    /// Starts an IMMEDIATE transaction, taking the write lock up front so
    /// concurrent writers to the same database serialize here. Dropping the
    /// returned transaction without `commit` rolls it back.
    pub fn transaction(&mut self) -> Result<Transaction<'_>, StorageError> {
        let tx = self
            .conn
            .transaction_with_behavior(TransactionBehavior::Immediate)?;
        debug!("event=tx_begin module=storage status=ok behavior=immediate");
        Ok(tx)
    }
}

pub fn commit(tx: Transaction<'_>) -> Result<(), StorageError> {
    match tx.commit() {
        Ok(()) => {
            debug!("event=tx_commit module=storage status=ok");
            Ok(())
        }
        Err(err) => {
            error!("event=tx_commit module=storage status=error error={err}");
            Err(err.into())
        }
    }
}

/// `PerformerRepository` over a borrowed connection. Pass a `Transaction` to
/// scope every call to it.
pub struct SqliteRepository<'conn> {
    conn: &'conn Connection,
}

impl<'conn> SqliteRepository<'conn> {
    pub fn new(conn: &'conn Connection) -> Self {
        Self { conn }
    }

    fn query_performers(
        &self,
        sql: &str,
        args: &[&dyn ToSql],
    ) -> Result<Vec<Performer>, StorageError> {
        let mut stmt = self.conn.prepare(sql)?;
        let mut rows = stmt.query(args)?;
        let mut performers = Vec::new();
        while let Some(row) = rows.next()? {
            performers.push(read_performer(row)?);
        }
        Ok(performers)
    }

    fn write_scalars(&self, performer: &Performer, partial: bool) -> Result<Performer, StorageError> {
        let id_blob: &[u8] = performer.id.as_bytes().as_slice();
        let gender = performer.gender.map(|g| g.as_str());
        let now = Utc::now();

        let mut sets = vec!["name = ?".to_string(), "updated_at = ?".to_string()];
        let mut args: Vec<&dyn ToSql> = vec![&performer.name as &dyn ToSql, &now];
        for (column, present, value) in scalar_columns(performer, &gender) {
            if present || !partial {
                sets.push(format!("{column} = ?"));
                args.push(value);
            }
        }
        args.push(&id_blob);

        let sql = format!("UPDATE performers SET {} WHERE id = ?", sets.join(", "));
        let changed = self.conn.execute(&sql, &args[..])?;
        if changed == 0 {
            return Err(StorageError::NotFound(format!("performer {}", performer.id)));
        }
        self.require(performer.id)
    }

    /// Rows of an attachment table for every id, one group per requested id in
    /// request order. `read` sees the selected columns from index 1 on.
    fn grouped<T: Clone>(
        &self,
        kind: AttachmentKind,
        columns: &str,
        ids: &[PerformerId],
        read: impl Fn(&Row<'_>) -> rusqlite::Result<T>,
    ) -> Result<Vec<Vec<T>>, StorageError> {
        if ids.is_empty() {
            return Ok(Vec::new());
        }
        let table = attachment_table(kind);
        let sql = format!(
            "SELECT performer_id, {columns} FROM {table} WHERE performer_id IN ({}) ORDER BY rowid",
            in_placeholders(ids.len())
        );
        let mut stmt = self.conn.prepare(&sql)?;
        let mut rows = stmt.query(params_from_iter(ids.iter().map(|id| id.as_bytes().to_vec())))?;
        let mut by_id: HashMap<PerformerId, Vec<T>> = HashMap::new();
        while let Some(row) = rows.next()? {
            let owner = read_performer_id(row.get(0)?, table)?;
            by_id.entry(owner).or_default().push(read(row)?);
        }
        Ok(ids
            .iter()
            .map(|id| by_id.get(id).cloned().unwrap_or_default())
            .collect())
    }

    fn require(&self, id: PerformerId) -> Result<Performer, StorageError> {
        self.find(id)?
            .ok_or_else(|| StorageError::NotFound(format!("performer {id}")))
    }
}

fn read_performer(row: &Row<'_>) -> Result<Performer, StorageError> {
    let id = PerformerId::from_bytes(to_array::<16>(row.get(0)?, "performers.id")?);
    let gender = match row.get::<_, Option<String>>(3)? {
        Some(value) => Some(
            Gender::parse(&value).map_err(|e| StorageError::InvalidData(e.to_string()))?,
        ),
        None => None,
    };

    Ok(Performer {
        id,
        name: row.get(1)?,
        disambiguation: row.get(2)?,
        gender,
        birthdate: row.get(4)?,
        ethnicity: row.get(5)?,
        country: row.get(6)?,
        eye_color: row.get(7)?,
        hair_color: row.get(8)?,
        height: row.get(9)?,
        career_start_year: row.get(10)?,
        career_end_year: row.get(11)?,
        deleted: row.get(12)?,
        created_at: row.get(13)?,
        updated_at: row.get(14)?,
    })
}

fn read_performer_id(bytes: Vec<u8>, label: &str) -> Result<PerformerId, StorageError> {
    Ok(PerformerId::from_bytes(to_array::<16>(bytes, label)?))
}

/// Optional scalar columns with a flag telling whether the value is set.
fn scalar_columns<'a>(
    p: &'a Performer,
    gender: &'a Option<&'static str>,
) -> [(&'static str, bool, &'a dyn ToSql); 10] {
    [
        ("disambiguation", p.disambiguation.is_some(), &p.disambiguation),
        ("gender", gender.is_some(), gender),
        ("birthdate", p.birthdate.is_some(), &p.birthdate),
        ("ethnicity", p.ethnicity.is_some(), &p.ethnicity),
        ("country", p.country.is_some(), &p.country),
        ("eye_color", p.eye_color.is_some(), &p.eye_color),
        ("hair_color", p.hair_color.is_some(), &p.hair_color),
        ("height", p.height.is_some(), &p.height),
        ("career_start_year", p.career_start_year.is_some(), &p.career_start_year),
        ("career_end_year", p.career_end_year.is_some(), &p.career_end_year),
    ]
}

fn attachment_table(kind: AttachmentKind) -> &'static str {
    match kind {
        AttachmentKind::Alias => "performer_aliases",
        AttachmentKind::Url => "performer_urls",
        AttachmentKind::Tattoo => "performer_tattoos",
        AttachmentKind::Piercing => "performer_piercings",
    }
}

/// Lays `items` out in the order of `ids`, leaving `None` where no item
/// matched. Output length always equals `ids.len()`.
pub(crate) fn align_positional<T: Clone>(
    ids: &[PerformerId],
    items: Vec<T>,
    key: impl Fn(&T) -> PerformerId,
) -> Vec<Option<T>> {
    let by_id: HashMap<PerformerId, T> = items.into_iter().map(|item| (key(&item), item)).collect();
    ids.iter().map(|id| by_id.get(id).cloned()).collect()
}

fn in_placeholders(count: usize) -> String {
    vec!["?"; count].join(", ")
}

/// WHERE clause and its bound values for `filter`.
fn filter_clauses(filter: &PerformerFilter, today: NaiveDate) -> (String, Vec<Value>) {
    let mut clauses = vec!["performers.deleted = 0".to_string()];
    let mut args: Vec<Value> = Vec::new();

    if let Some(name) = filter.name.as_deref().filter(|n| !n.is_empty()) {
        clauses.push("instr(lower(performers.name), lower(?)) > 0".to_string());
        args.push(Value::Text(name.to_string()));
    }
    if let Some(country) = &filter.country {
        clauses.push("performers.country = ?".to_string());
        args.push(Value::Text(country.clone()));
    }
    if let Some(criterion) = filter.birth_year {
        date_args(
            compile_birth_year(criterion.modifier, criterion.value),
            &mut clauses,
            &mut args,
        );
    }
    if let Some(criterion) = filter.age {
        date_args(
            compile_age(criterion.modifier, criterion.value, today),
            &mut clauses,
            &mut args,
        );
    }
    (clauses.join(" AND "), args)
}

fn sort_column(sort: PerformerSort) -> &'static str {
    match sort {
        PerformerSort::Name => "performers.name",
        PerformerSort::Birthdate => "performers.birthdate",
        PerformerSort::CreatedAt => "performers.created_at",
        PerformerSort::UpdatedAt => "performers.updated_at",
    }
}

fn direction_sql(direction: SortDirection) -> &'static str {
    match direction {
        SortDirection::Asc => "ASC",
        SortDirection::Desc => "DESC",
    }
}

fn date_args(filter: DateRangeFilter, clauses: &mut Vec<String>, args: &mut Vec<Value>) {
    for clause in filter.clauses {
        clauses.push(format!("({clause})"));
    }
    for date in filter.args {
        args.push(Value::Text(date.format("%Y-%m-%d").to_string()));
    }
}

impl PerformerRepository for SqliteRepository<'_> {
    fn find(&self, id: PerformerId) -> Result<Option<Performer>, StorageError> {
        let sql = format!("SELECT {PERFORMER_COLUMNS} FROM performers WHERE performers.id = ?1");
        let id_blob: &[u8] = id.as_bytes().as_slice();
        Ok(self.query_performers(&sql, &[&id_blob])?.into_iter().next())
    }

    fn find_many(&self, ids: &[PerformerId]) -> Result<Vec<Option<Performer>>, StorageError> {
        if ids.is_empty() {
            return Ok(Vec::new());
        }
        let sql = format!(
            "SELECT {PERFORMER_COLUMNS} FROM performers WHERE performers.id IN ({})",
            in_placeholders(ids.len())
        );
        let mut stmt = self.conn.prepare(&sql)?;
        let mut rows = stmt.query(params_from_iter(ids.iter().map(|id| id.as_bytes().to_vec())))?;
        let mut performers = Vec::new();
        while let Some(row) = rows.next()? {
            performers.push(read_performer(row)?);
        }
        Ok(align_positional(ids, performers, |p| p.id))
    }

    fn find_by_name(&self, name: &str) -> Result<Vec<Performer>, StorageError> {
        let sql = format!(
            "SELECT {PERFORMER_COLUMNS} FROM performers WHERE upper(performers.name) = upper(?1)"
        );
        self.query_performers(&sql, &[&name])
    }

    fn find_by_alias(&self, alias: &str) -> Result<Vec<Performer>, StorageError> {
        let sql = format!(
            "SELECT {PERFORMER_COLUMNS} FROM performers
             JOIN performer_aliases ON performers.id = performer_aliases.performer_id
             WHERE performer_aliases.alias_key = ?1"
        );
        let key = Alias::new(alias).normalized();
        self.query_performers(&sql, &[&key])
    }

    fn find_by_scene(&self, scene_id: SceneId) -> Result<Vec<Performer>, StorageError> {
        let sql = format!(
            "SELECT {PERFORMER_COLUMNS} FROM performers
             JOIN scene_performers ON scene_performers.performer_id = performers.id
             WHERE scene_performers.scene_id = ?1
             ORDER BY performers.name"
        );
        let scene_blob: &[u8] = scene_id.as_bytes().as_slice();
        self.query_performers(&sql, &[&scene_blob])
    }

    fn count(&self) -> Result<u64, StorageError> {
        let count: i64 = self.conn.query_row(
            "SELECT COUNT(*) FROM performers WHERE deleted = 0",
            [],
            |row| row.get(0),
        )?;
        Ok(count as u64)
    }

    fn find_by_names(&self, names: &[&str]) -> Result<Vec<Performer>, StorageError> {
        if names.is_empty() {
            return Ok(Vec::new());
        }
        let sql = format!(
            "SELECT {PERFORMER_COLUMNS} FROM performers WHERE performers.name IN ({})
             ORDER BY performers.name, performers.id",
            in_placeholders(names.len())
        );
        let args: Vec<&dyn ToSql> = names.iter().map(|name| name as &dyn ToSql).collect();
        self.query_performers(&sql, &args[..])
    }

    fn find_by_aliases(&self, aliases: &[&str]) -> Result<Vec<Performer>, StorageError> {
        if aliases.is_empty() {
            return Ok(Vec::new());
        }
        let sql = format!(
            "SELECT DISTINCT {PERFORMER_COLUMNS} FROM performers
             JOIN performer_aliases ON performers.id = performer_aliases.performer_id
             WHERE performer_aliases.alias_key IN ({})
             ORDER BY performers.name, performers.id",
            in_placeholders(aliases.len())
        );
        let keys: Vec<String> = aliases
            .iter()
            .map(|alias| Alias::new(*alias).normalized())
            .collect();
        let args: Vec<&dyn ToSql> = keys.iter().map(|key| key as &dyn ToSql).collect();
        self.query_performers(&sql, &args[..])
    }

    fn query(
        &self,
        filter: &PerformerFilter,
        spec: &QuerySpec,
        today: NaiveDate,
    ) -> Result<PerformerPage, StorageError> {
        let (where_sql, args) = filter_clauses(filter, today);

        let count: i64 = self.conn.query_row(
            &format!("SELECT COUNT(*) FROM performers WHERE {where_sql}"),
            params_from_iter(args.iter()),
            |row| row.get(0),
        )?;

        let mut sql = format!(
            "SELECT {PERFORMER_COLUMNS} FROM performers WHERE {where_sql} ORDER BY {} {}, performers.id ASC",
            sort_column(spec.sort),
            direction_sql(spec.direction)
        );
        let mut page_args = args;
        if let Some(per_page) = spec.per_page {
            let offset = i64::from(spec.page.max(1) - 1) * i64::from(per_page);
            sql.push_str(" LIMIT ? OFFSET ?");
            page_args.push(Value::Integer(i64::from(per_page)));
            page_args.push(Value::Integer(offset));
        }

        let mut stmt = self.conn.prepare(&sql)?;
        let mut rows = stmt.query(params_from_iter(page_args))?;
        let mut performers = Vec::new();
        while let Some(row) = rows.next()? {
            performers.push(read_performer(row)?);
        }
        Ok(PerformerPage {
            performers,
            count: count as u64,
        })
    }

    fn insert(&self, performer: &Performer) -> Result<Performer, StorageError> {
        let id_blob: &[u8] = performer.id.as_bytes().as_slice();
        let gender = performer.gender.map(|g| g.as_str());

        let mut columns = vec!["id", "name", "deleted", "created_at", "updated_at"];
        let mut args: Vec<&dyn ToSql> = vec![
            &id_blob as &dyn ToSql,
            &performer.name,
            &performer.deleted,
            &performer.created_at,
            &performer.updated_at,
        ];
        for (column, _, value) in scalar_columns(performer, &gender) {
            columns.push(column);
            args.push(value);
        }

        let sql = format!(
            "INSERT INTO performers ({}) VALUES ({})",
            columns.join(", "),
            in_placeholders(columns.len())
        );
        match self.conn.execute(&sql, &args[..]) {
            Ok(_) => {}
            Err(rusqlite::Error::SqliteFailure(err, _))
                if err.code == rusqlite::ErrorCode::ConstraintViolation =>
            {
                return Err(StorageError::ConstraintViolation(format!(
                    "performer {} already exists",
                    performer.id
                )));
            }
            Err(e) => return Err(StorageError::Sqlite(e)),
        }
        self.require(performer.id)
    }

    fn update_full(&self, performer: &Performer) -> Result<Performer, StorageError> {
        self.write_scalars(performer, false)
    }

    fn update_partial(&self, performer: &Performer) -> Result<Performer, StorageError> {
        self.write_scalars(performer, true)
    }

    fn soft_delete(&self, performer: &Performer) -> Result<Performer, StorageError> {
        let changed = self.conn.execute(
            "UPDATE performers SET deleted = 1, updated_at = ?1 WHERE id = ?2",
            params![Utc::now(), performer.id.as_bytes().as_slice()],
        )?;
        if changed == 0 {
            return Err(StorageError::NotFound(format!("performer {}", performer.id)));
        }
        self.require(performer.id)
    }

    fn aliases(&self, id: PerformerId) -> Result<Vec<Alias>, StorageError> {
        let mut stmt = self.conn.prepare(
            "SELECT alias FROM performer_aliases WHERE performer_id = ?1 ORDER BY rowid",
        )?;
        let aliases = stmt
            .query_map(params![id.as_bytes().as_slice()], |row| {
                row.get::<_, String>(0).map(Alias)
            })?
            .collect::<Result<Vec<_>, _>>()?;
        Ok(aliases)
    }

    fn all_aliases(&self, ids: &[PerformerId]) -> Result<Vec<Vec<Alias>>, StorageError> {
        self.grouped(AttachmentKind::Alias, "alias", ids, |row| row.get(1).map(Alias))
    }

    fn replace_aliases(&self, id: PerformerId, aliases: &[Alias]) -> Result<(), StorageError> {
        self.delete_attachments(AttachmentKind::Alias, id)?;
        let mut stmt = self.conn.prepare_cached(
            "INSERT INTO performer_aliases (performer_id, alias, alias_key) VALUES (?1, ?2, ?3)",
        )?;
        for alias in aliases {
            stmt.execute(params![
                id.as_bytes().as_slice(),
                alias.as_str(),
                alias.normalized()
            ])?;
        }
        Ok(())
    }

    fn urls(&self, id: PerformerId) -> Result<Vec<Url>, StorageError> {
        let mut stmt = self.conn.prepare(
            "SELECT url, type FROM performer_urls WHERE performer_id = ?1 ORDER BY rowid",
        )?;
        let urls = stmt
            .query_map(params![id.as_bytes().as_slice()], |row| {
                Ok(Url {
                    url: row.get(0)?,
                    kind: row.get(1)?,
                })
            })?
            .collect::<Result<Vec<_>, _>>()?;
        Ok(urls)
    }

    fn all_urls(&self, ids: &[PerformerId]) -> Result<Vec<Vec<Url>>, StorageError> {
        self.grouped(AttachmentKind::Url, "url, type", ids, |row| {
            Ok(Url {
                url: row.get(1)?,
                kind: row.get(2)?,
            })
        })
    }

    fn replace_urls(&self, id: PerformerId, urls: &[Url]) -> Result<(), StorageError> {
        self.delete_attachments(AttachmentKind::Url, id)?;
        let mut stmt = self.conn.prepare_cached(
            "INSERT INTO performer_urls (performer_id, url, type) VALUES (?1, ?2, ?3)",
        )?;
        for url in urls {
            stmt.execute(params![id.as_bytes().as_slice(), url.url, url.kind])?;
        }
        Ok(())
    }

    fn body_mods(
        &self,
        kind: BodyModKind,
        id: PerformerId,
    ) -> Result<Vec<BodyModification>, StorageError> {
        let sql = format!(
            "SELECT location, description FROM {} WHERE performer_id = ?1 ORDER BY rowid",
            attachment_table(kind.into())
        );
        let mut stmt = self.conn.prepare(&sql)?;
        let mods = stmt
            .query_map(params![id.as_bytes().as_slice()], |row| {
                Ok(BodyModification {
                    location: row.get(0)?,
                    description: row.get(1)?,
                })
            })?
            .collect::<Result<Vec<_>, _>>()?;
        Ok(mods)
    }

    fn all_body_mods(
        &self,
        kind: BodyModKind,
        ids: &[PerformerId],
    ) -> Result<Vec<Vec<BodyModification>>, StorageError> {
        self.grouped(kind.into(), "location, description", ids, |row| {
            Ok(BodyModification {
                location: row.get(1)?,
                description: row.get(2)?,
            })
        })
    }

    fn replace_body_mods(
        &self,
        kind: BodyModKind,
        id: PerformerId,
        mods: &[BodyModification],
    ) -> Result<(), StorageError> {
        self.delete_attachments(kind.into(), id)?;
        let sql = format!(
            "INSERT INTO {} (performer_id, location, description) VALUES (?1, ?2, ?3)",
            attachment_table(kind.into())
        );
        let mut stmt = self.conn.prepare_cached(&sql)?;
        for body_mod in mods {
            stmt.execute(params![
                id.as_bytes().as_slice(),
                body_mod.location,
                body_mod.description
            ])?;
        }
        Ok(())
    }

    fn delete_attachments(
        &self,
        kind: AttachmentKind,
        id: PerformerId,
    ) -> Result<(), StorageError> {
        let sql = format!(
            "DELETE FROM {} WHERE performer_id = ?1",
            attachment_table(kind)
        );
        self.conn.execute(&sql, params![id.as_bytes().as_slice()])?;
        Ok(())
    }

    fn create_redirect(
        &self,
        source: PerformerId,
        target: PerformerId,
    ) -> Result<(), StorageError> {
        let result = self.conn.execute(
            "INSERT INTO performer_redirects (source_id, target_id) VALUES (?1, ?2)",
            params![source.as_bytes().as_slice(), target.as_bytes().as_slice()],
        );
        match result {
            Ok(_) => Ok(()),
            Err(rusqlite::Error::SqliteFailure(err, _))
                if err.code == rusqlite::ErrorCode::ConstraintViolation =>
            {
                Err(StorageError::ConstraintViolation(format!(
                    "redirect {source} -> {target}"
                )))
            }
            Err(e) => Err(StorageError::Sqlite(e)),
        }
    }

    fn rewrite_redirects(
        &self,
        old_target: PerformerId,
        new_target: PerformerId,
    ) -> Result<usize, StorageError> {
        let changed = self.conn.execute(
            "UPDATE performer_redirects SET target_id = ?1 WHERE target_id = ?2",
            params![
                new_target.as_bytes().as_slice(),
                old_target.as_bytes().as_slice()
            ],
        )?;
        Ok(changed)
    }

    fn redirect_target(&self, source: PerformerId) -> Result<Option<PerformerId>, StorageError> {
        let target: Option<Vec<u8>> = self
            .conn
            .query_row(
                "SELECT target_id FROM performer_redirects WHERE source_id = ?1",
                params![source.as_bytes().as_slice()],
                |row| row.get(0),
            )
            .optional()?;
        target
            .map(|bytes| read_performer_id(bytes, "performer_redirects.target_id"))
            .transpose()
    }

    fn redirects_to(&self, target: PerformerId) -> Result<Vec<PerformerId>, StorageError> {
        let mut stmt = self.conn.prepare(
            "SELECT source_id FROM performer_redirects WHERE target_id = ?1 ORDER BY rowid",
        )?;
        let mut rows = stmt.query(params![target.as_bytes().as_slice()])?;
        let mut sources = Vec::new();
        while let Some(row) = rows.next()? {
            sources.push(read_performer_id(row.get(0)?, "performer_redirects.source_id")?);
        }
        Ok(sources)
    }

    fn link_scene(&self, scene_id: SceneId, performer_id: PerformerId) -> Result<(), StorageError> {
        self.conn.execute(
            "INSERT OR IGNORE INTO scene_performers (scene_id, performer_id) VALUES (?1, ?2)",
            params![
                scene_id.as_bytes().as_slice(),
                performer_id.as_bytes().as_slice()
            ],
        )?;
        Ok(())
    }

    fn scenes_for_performer(&self, id: PerformerId) -> Result<Vec<SceneId>, StorageError> {
        let mut stmt = self.conn.prepare(
            "SELECT scene_id FROM scene_performers WHERE performer_id = ?1 ORDER BY rowid",
        )?;
        let mut rows = stmt.query(params![id.as_bytes().as_slice()])?;
        let mut scenes = Vec::new();
        while let Some(row) = rows.next()? {
            scenes.push(SceneId::from_bytes(to_array::<16>(
                row.get(0)?,
                "scene_performers.scene_id",
            )?));
        }
        Ok(scenes)
    }

    fn reassign_scene_performers(
        &self,
        source: PerformerId,
        target: PerformerId,
    ) -> Result<(), StorageError> {
        self.conn.execute(
            "INSERT OR IGNORE INTO scene_performers (scene_id, performer_id)
             SELECT scene_id, ?1 FROM scene_performers WHERE performer_id = ?2",
            params![target.as_bytes().as_slice(), source.as_bytes().as_slice()],
        )?;
        self.delete_scene_performers(source)
    }

    fn delete_scene_performers(&self, id: PerformerId) -> Result<(), StorageError> {
        self.conn.execute(
            "DELETE FROM scene_performers WHERE performer_id = ?1",
            params![id.as_bytes().as_slice()],
        )?;
        Ok(())
    }
}
