use anyhow::{bail, Result};
use async_trait::async_trait;
use bigdecimal::BigDecimal;
use sqlx::{postgres::PgRow, PgPool, Row};

use crate::models::Delegator;
use crate::repositories::traits::DelegatorRepository;

pub struct PostgresDelegatorRepository {
    pool: PgPool,
}

impl PostgresDelegatorRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

fn delegator_from_row(r: &PgRow) -> Result<Delegator> {
    Ok(Delegator {
        delegator_address: r.try_get("delegator_address")?,
        validator_address: r.try_get("validator_address")?,
        chain_id: r.try_get("chain_id")?,
        shares: r.try_get("shares")?,
        balance_amount: r.try_get("balance_amount")?,
        balance_denom: r.try_get("balance_denom")?,
    })
}

#[async_trait]
impl DelegatorRepository for PostgresDelegatorRepository {
    async fn find_delegator(
        &self,
        chain_id: &str,
        validator_address: &str,
        delegator_address: &str,
    ) -> Result<Option<Delegator>> {
        let record = sqlx::query(
            r#"
            SELECT delegator_address, validator_address, chain_id,
                   shares, balance_amount, balance_denom
            FROM delegators
            WHERE chain_id = $1 AND validator_address = $2 AND delegator_address = $3
            "#,
        )
        .bind(chain_id)
        .bind(validator_address)
        .bind(delegator_address)
        .fetch_optional(&self.pool)
        .await?;

        record.as_ref().map(delegator_from_row).transpose()
    }

    async fn insert_delegator(&self, delegator: &Delegator) -> Result<()> {
        sqlx::query(
            r#"
            INSERT INTO delegators (
                delegator_address, validator_address, chain_id,
                shares, balance_amount, balance_denom
            ) VALUES ($1, $2, $3, $4, $5, $6)
            "#,
        )
        .bind(&delegator.delegator_address)
        .bind(&delegator.validator_address)
        .bind(&delegator.chain_id)
        .bind(&delegator.shares)
        .bind(&delegator.balance_amount)
        .bind(&delegator.balance_denom)
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    async fn update_delegator_balance(
        &self,
        chain_id: &str,
        validator_address: &str,
        delegator_address: &str,
        balance_amount: &BigDecimal,
    ) -> Result<()> {
        let result = sqlx::query(
            r#"
            UPDATE delegators
            SET balance_amount = $4
            WHERE chain_id = $1 AND validator_address = $2 AND delegator_address = $3
            "#,
        )
        .bind(chain_id)
        .bind(validator_address)
        .bind(delegator_address)
        .bind(balance_amount)
        .execute(&self.pool)
        .await?;

        if result.rows_affected() == 0 {
            bail!("delegator {delegator_address} of {validator_address} not found on chain {chain_id}");
        }
        Ok(())
    }

    async fn list_delegator_addresses(&self, chain_id: &str, validator_address: &str) -> Result<Vec<String>> {
        let records = sqlx::query(
            r#"
            SELECT delegator_address
            FROM delegators
            WHERE chain_id = $1 AND validator_address = $2
            ORDER BY delegator_address
            "#,
        )
        .bind(chain_id)
        .bind(validator_address)
        .fetch_all(&self.pool)
        .await?;

        let mut addresses = Vec::with_capacity(records.len());
        for r in records {
            addresses.push(r.try_get("delegator_address")?);
        }

        Ok(addresses)
    }

    async fn delete_delegator(
        &self,
        chain_id: &str,
        validator_address: &str,
        delegator_address: &str,
    ) -> Result<u64> {
        let result = sqlx::query(
            r#"
            DELETE FROM delegators
            WHERE chain_id = $1 AND validator_address = $2 AND delegator_address = $3
            "#,
        )
        .bind(chain_id)
        .bind(validator_address)
        .bind(delegator_address)
        .execute(&self.pool)
        .await?;

        Ok(result.rows_affected())
    }
}
