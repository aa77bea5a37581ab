use anyhow::{bail, Result};
use async_trait::async_trait;
use sqlx::{postgres::PgRow, PgPool, Row};

use crate::models::Validator;
use crate::repositories::traits::ValidatorRepository;

pub struct PostgresValidatorRepository {
    pool: PgPool,
}

impl PostgresValidatorRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

fn validator_from_row(r: &PgRow) -> Result<Validator> {
    Ok(Validator {
        operator_address: r.try_get("operator_address")?,
        chain_id: r.try_get("chain_id")?,
        consensus_pubkey: r.try_get("consensus_pubkey")?,
        jailed: r.try_get("jailed")?,
        status: r.try_get("status")?,
        tokens: r.try_get("tokens")?,
        delegator_shares: r.try_get("delegator_shares")?,
        moniker: r.try_get("moniker")?,
        identity: r.try_get("identity")?,
        website: r.try_get("website")?,
        security_contact: r.try_get("security_contact")?,
        details: r.try_get("details")?,
        commission_rate: r.try_get("commission_rate")?,
        commission_max_rate: r.try_get("commission_max_rate")?,
        commission_max_change_rate: r.try_get("commission_max_change_rate")?,
        min_self_delegation: r.try_get("min_self_delegation")?,
    })
}

#[async_trait]
impl ValidatorRepository for PostgresValidatorRepository {
    async fn find_validator(&self, chain_id: &str, operator_address: &str) -> Result<Option<Validator>> {
        let record = sqlx::query(
            r#"
            SELECT
                operator_address, chain_id, consensus_pubkey, jailed, status,
                tokens, delegator_shares, moniker, identity, website,
                security_contact, details, commission_rate, commission_max_rate,
                commission_max_change_rate, min_self_delegation
            FROM validators
            WHERE chain_id = $1 AND operator_address = $2
            "#,
        )
        .bind(chain_id)
        .bind(operator_address)
        .fetch_optional(&self.pool)
        .await?;

        record.as_ref().map(validator_from_row).transpose()
    }

    async fn insert_validator(&self, validator: &Validator) -> Result<()> {
        sqlx::query(
            r#"
            INSERT INTO validators (
                operator_address, chain_id, consensus_pubkey, jailed, status,
                tokens, delegator_shares, moniker, identity, website,
                security_contact, details, commission_rate, commission_max_rate,
                commission_max_change_rate, min_self_delegation
            ) VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13, $14, $15, $16)
            "#,
        )
        .bind(&validator.operator_address)
        .bind(&validator.chain_id)
        .bind(&validator.consensus_pubkey)
        .bind(validator.jailed)
        .bind(&validator.status)
        .bind(&validator.tokens)
        .bind(&validator.delegator_shares)
        .bind(&validator.moniker)
        .bind(&validator.identity)
        .bind(&validator.website)
        .bind(&validator.security_contact)
        .bind(&validator.details)
        .bind(&validator.commission_rate)
        .bind(&validator.commission_max_rate)
        .bind(&validator.commission_max_change_rate)
        .bind(&validator.min_self_delegation)
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    async fn update_validator(&self, validator: &Validator) -> Result<()> {
        let result = sqlx::query(
            r#"
            UPDATE validators
            SET consensus_pubkey = $3,
                jailed = $4,
                status = $5,
                tokens = $6,
                delegator_shares = $7,
                moniker = $8,
                identity = $9,
                website = $10,
                security_contact = $11,
                details = $12,
                commission_rate = $13,
                commission_max_rate = $14,
                commission_max_change_rate = $15,
                min_self_delegation = $16
            WHERE operator_address = $1 AND chain_id = $2
            "#,
        )
        .bind(&validator.operator_address)
        .bind(&validator.chain_id)
        .bind(&validator.consensus_pubkey)
        .bind(validator.jailed)
        .bind(&validator.status)
        .bind(&validator.tokens)
        .bind(&validator.delegator_shares)
        .bind(&validator.moniker)
        .bind(&validator.identity)
        .bind(&validator.website)
        .bind(&validator.security_contact)
        .bind(&validator.details)
        .bind(&validator.commission_rate)
        .bind(&validator.commission_max_rate)
        .bind(&validator.commission_max_change_rate)
        .bind(&validator.min_self_delegation)
        .execute(&self.pool)
        .await?;

        if result.rows_affected() == 0 {
            bail!("validator {} not found on chain {}", validator.operator_address, validator.chain_id);
        }
        Ok(())
    }
}
