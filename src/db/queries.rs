//! SQL query constants
//!
//! Contains all SQL queries used by the application.

/// Enum types, tables and indexes. Safe to run on every start.
pub const CREATE_SCHEMA: &str = r#"
    DO $$ BEGIN
        CREATE TYPE ad_condition AS ENUM ('new', 'used', 'broken');
    EXCEPTION WHEN duplicate_object THEN NULL;
    END $$;

    DO $$ BEGIN
        CREATE TYPE proposal_status AS ENUM ('pending', 'accepted', 'rejected');
    EXCEPTION WHEN duplicate_object THEN NULL;
    END $$;

    CREATE TABLE IF NOT EXISTS users (
        id SERIAL PRIMARY KEY,
        username VARCHAR(150) UNIQUE NOT NULL,
        email VARCHAR(254),
        password_hash VARCHAR(255) NOT NULL,
        created_at TIMESTAMPTZ NOT NULL DEFAULT now()
    );

    CREATE TABLE IF NOT EXISTS ads (
        id SERIAL PRIMARY KEY,
        user_id INTEGER NOT NULL REFERENCES users(id) ON DELETE CASCADE,
        title VARCHAR(50) NOT NULL,
        description TEXT NOT NULL DEFAULT '',
        image_url TEXT,
        category VARCHAR(50) NOT NULL,
        condition ad_condition NOT NULL,
        created_at TIMESTAMPTZ NOT NULL DEFAULT now()
    );

    CREATE INDEX IF NOT EXISTS idx_ads_category_condition ON ads(category, condition);
    CREATE INDEX IF NOT EXISTS idx_ads_created_at ON ads(created_at DESC);

    CREATE TABLE IF NOT EXISTS exchange_proposals (
        id SERIAL PRIMARY KEY,
        ad_sender INTEGER NOT NULL REFERENCES ads(id) ON DELETE CASCADE,
        ad_receiver INTEGER NOT NULL REFERENCES ads(id) ON DELETE CASCADE,
        comment TEXT NOT NULL DEFAULT '',
        status proposal_status NOT NULL DEFAULT 'pending',
        created_at TIMESTAMPTZ NOT NULL DEFAULT now(),
        CONSTRAINT unique_proposal UNIQUE (ad_sender, ad_receiver)
    );

    CREATE INDEX IF NOT EXISTS idx_proposals_ad_receiver ON exchange_proposals(ad_receiver);
    CREATE INDEX IF NOT EXISTS idx_proposals_status ON exchange_proposals(status);
"#;

pub const INSERT_USER: &str = r#"
    INSERT INTO users (username, email, password_hash)
    VALUES ($1, $2, $3)
    RETURNING id, username, email, password_hash, created_at
"#;

pub const GET_USER_BY_ID: &str = r#"
    SELECT id, username, email, password_hash, created_at
    FROM users
    WHERE id = $1
"#;

pub const GET_USER_BY_USERNAME: &str = r#"
    SELECT id, username, email, password_hash, created_at
    FROM users
    WHERE username = $1
"#;

/// Insert an ad and return it joined with its owner
pub const INSERT_AD: &str = r#"
    WITH inserted AS (
        INSERT INTO ads (user_id, title, description, image_url, category, condition)
        VALUES ($1, $2, $3, $4, $5, $6)
        RETURNING *
    )
    SELECT a.id, a.user_id, u.username, a.title, a.description, a.image_url,
           a.category, a.condition, a.created_at
    FROM inserted a
    JOIN users u ON u.id = a.user_id
"#;

pub const GET_AD: &str = r#"
    SELECT a.id, a.user_id, u.username, a.title, a.description, a.image_url,
           a.category, a.condition, a.created_at
    FROM ads a
    JOIN users u ON u.id = a.user_id
    WHERE a.id = $1
"#;

/// Apply changes; NULL parameters keep the current value.
/// `$4` says whether `$5` replaces the image (so the image can be cleared).
pub const UPDATE_AD: &str = r#"
    WITH updated AS (
        UPDATE ads
        SET title = COALESCE($2, title),
            description = COALESCE($3, description),
            image_url = CASE WHEN $4 THEN $5 ELSE image_url END,
            category = COALESCE($6, category),
            condition = COALESCE($7, condition)
        WHERE id = $1
        RETURNING *
    )
    SELECT a.id, a.user_id, u.username, a.title, a.description, a.image_url,
           a.category, a.condition, a.created_at
    FROM updated a
    JOIN users u ON u.id = a.user_id
"#;

pub const DELETE_AD: &str = "DELETE FROM ads WHERE id = $1";

/// Filtered ad listing.
///
/// `$1` category, `$2` condition, `$3` lowercase search terms (each must hit
/// the title or description), `$4` limit, `$5` offset.
pub const LIST_ADS: &str = r#"
    SELECT a.id, a.user_id, u.username, a.title, a.description, a.image_url,
           a.category, a.condition, a.created_at
    FROM ads a
    JOIN users u ON u.id = a.user_id
    WHERE ($1::text IS NULL OR a.category = $1)
      AND ($2::ad_condition IS NULL OR a.condition = $2)
      AND NOT EXISTS (
          SELECT 1 FROM unnest($3::text[]) AS term
          WHERE strpos(lower(a.title), term) = 0
            AND strpos(lower(a.description), term) = 0
      )
    ORDER BY a.created_at DESC, a.id DESC
    LIMIT $4 OFFSET $5
"#;

pub const COUNT_ADS: &str = r#"
    SELECT COUNT(*)
    FROM ads a
    WHERE ($1::text IS NULL OR a.category = $1)
      AND ($2::ad_condition IS NULL OR a.condition = $2)
      AND NOT EXISTS (
          SELECT 1 FROM unnest($3::text[]) AS term
          WHERE strpos(lower(a.title), term) = 0
            AND strpos(lower(a.description), term) = 0
      )
"#;

pub const INSERT_PROPOSAL: &str = r#"
    INSERT INTO exchange_proposals (ad_sender, ad_receiver, comment)
    VALUES ($1, $2, $3)
    RETURNING id, ad_sender, ad_receiver, comment, status, created_at
"#;

pub const GET_PROPOSAL: &str = r#"
    SELECT id, ad_sender, ad_receiver, comment, status, created_at
    FROM exchange_proposals
    WHERE id = $1
"#;

/// One-shot transition: only a pending row is updated
pub const DECIDE_PROPOSAL: &str = r#"
    UPDATE exchange_proposals
    SET status = $2
    WHERE id = $1 AND status = 'pending'
    RETURNING id, ad_sender, ad_receiver, comment, status, created_at
"#;

/// `$1` status, `$2` sender ad, `$3` receiver ad, `$4` limit, `$5` offset
pub const LIST_PROPOSALS: &str = r#"
    SELECT id, ad_sender, ad_receiver, comment, status, created_at
    FROM exchange_proposals
    WHERE ($1::proposal_status IS NULL OR status = $1)
      AND ($2::int4 IS NULL OR ad_sender = $2)
      AND ($3::int4 IS NULL OR ad_receiver = $3)
    ORDER BY created_at DESC, id DESC
    LIMIT $4 OFFSET $5
"#;

pub const COUNT_PROPOSALS: &str = r#"
    SELECT COUNT(*)
    FROM exchange_proposals
    WHERE ($1::proposal_status IS NULL OR status = $1)
      AND ($2::int4 IS NULL OR ad_sender = $2)
      AND ($3::int4 IS NULL OR ad_receiver = $3)
"#;
