use anyhow::{bail, Result};
use async_trait::async_trait;
use sqlx::{postgres::PgRow, PgPool, Row};

use crate::models::{ChainConfig, RemovalSummary};
use crate::repositories::traits::ChainConfigRepository;

pub struct PostgresChainRepository {
    pool: PgPool,
}

impl PostgresChainRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

fn chain_from_row(record: &PgRow) -> Result<ChainConfig> {
    Ok(ChainConfig {
        name: record.try_get("name")?,
        chain_id: record.try_get("chain_id")?,
        address_prefix: record.try_get("prefix")?,
        rpc_endpoint: record.try_get("rpc_endpoint")?,
        api_endpoint: record.try_get("api_endpoint")?,
        grpc_endpoint: record.try_get("grpc_endpoint")?,
    })
}

#[async_trait]
impl ChainConfigRepository for PostgresChainRepository {
    async fn find_by_chain_id(&self, chain_id: &str) -> Result<Option<ChainConfig>> {
        let record = sqlx::query(
            r#"
            SELECT name, chain_id, prefix, rpc_endpoint, api_endpoint, grpc_endpoint
            FROM chain_config
            WHERE chain_id = $1
            "#,
        )
        .bind(chain_id)
        .fetch_optional(&self.pool)
        .await?;

        record.as_ref().map(chain_from_row).transpose()
    }

    async fn find_by_name(&self, name: &str) -> Result<Option<ChainConfig>> {
        let record = sqlx::query(
            r#"
            SELECT name, chain_id, prefix, rpc_endpoint, api_endpoint, grpc_endpoint
            FROM chain_config
            WHERE name = $1
            "#,
        )
        .bind(name)
        .fetch_optional(&self.pool)
        .await?;

        record.as_ref().map(chain_from_row).transpose()
    }

    async fn list_chains(&self) -> Result<Vec<ChainConfig>> {
        let records = sqlx::query(
            r#"
            SELECT name, chain_id, prefix, rpc_endpoint, api_endpoint, grpc_endpoint
            FROM chain_config
            ORDER BY name
            "#,
        )
        .fetch_all(&self.pool)
        .await?;

        records.iter().map(chain_from_row).collect()
    }

    async fn insert_chain(&self, chain: &ChainConfig) -> Result<()> {
        sqlx::query(
            r#"
            INSERT INTO chain_config (
                chain_id, name, prefix, rpc_endpoint, api_endpoint, grpc_endpoint
            ) VALUES ($1, $2, $3, $4, $5, $6)
            "#,
        )
        .bind(&chain.chain_id)
        .bind(&chain.name)
        .bind(&chain.address_prefix)
        .bind(&chain.rpc_endpoint)
        .bind(&chain.api_endpoint)
        .bind(chain.grpc_endpoint.as_deref())
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    async fn update_chain(&self, chain: &ChainConfig) -> Result<()> {
        let result = sqlx::query(
            r#"
            UPDATE chain_config
            SET name = $2,
                prefix = $3,
                rpc_endpoint = $4,
                api_endpoint = $5,
                grpc_endpoint = $6
            WHERE chain_id = $1
            "#,
        )
        .bind(&chain.chain_id)
        .bind(&chain.name)
        .bind(&chain.address_prefix)
        .bind(&chain.rpc_endpoint)
        .bind(&chain.api_endpoint)
        .bind(chain.grpc_endpoint.as_deref())
        .execute(&self.pool)
        .await?;

        if result.rows_affected() == 0 {
            bail!("chain {} not found", chain.chain_id);
        }
        Ok(())
    }

    async fn delete_chain_cascade(&self, chain_id: &str) -> Result<RemovalSummary> {
        let mut tx = self.pool.begin().await?;

        let delegators = sqlx::query("DELETE FROM delegators WHERE chain_id = $1")
            .bind(chain_id)
            .execute(&mut *tx)
            .await?
            .rows_affected();
        let validators = sqlx::query("DELETE FROM validators WHERE chain_id = $1")
            .bind(chain_id)
            .execute(&mut *tx)
            .await?
            .rows_affected();
        let proposals = sqlx::query("DELETE FROM governance_proposals WHERE chain_id = $1")
            .bind(chain_id)
            .execute(&mut *tx)
            .await?
            .rows_affected();
        let chains = sqlx::query("DELETE FROM chain_config WHERE chain_id = $1")
            .bind(chain_id)
            .execute(&mut *tx)
            .await?
            .rows_affected();

        // Dropping `tx` without committing rolls every delete back.
        if chains == 0 {
            bail!("chain {chain_id} not found");
        }
        tx.commit().await?;

        Ok(RemovalSummary {
            delegators,
            validators,
            proposals,
        })
    }
}
