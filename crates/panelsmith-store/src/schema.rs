//! Episode store database schema.

/// SQL to create the episodes table. Panels are stored inline, in insertion
/// order, as a JSONB array.
pub const CREATE_EPISODES_TABLE: &str = r"
CREATE TABLE IF NOT EXISTS episodes (
    id          BIGINT PRIMARY KEY,
    title       TEXT NOT NULL,
    arc         TEXT NOT NULL,
    status      VARCHAR(32) NOT NULL,
    summary     TEXT NOT NULL,
    page_count  INTEGER NOT NULL,
    panels      JSONB NOT NULL DEFAULT '[]'::jsonb
);

CREATE INDEX IF NOT EXISTS idx_episodes_status
    ON episodes (status);
";
