use anyhow::{bail, Result};
use async_trait::async_trait;
use sqlx::{postgres::PgRow, PgPool, Row};

use crate::models::{GovernanceProposal, VoteTally};
use crate::repositories::traits::ProposalRepository;

pub struct PostgresProposalRepository {
    pool: PgPool,
}

impl PostgresProposalRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

fn proposal_from_row(r: &PgRow) -> Result<GovernanceProposal> {
    Ok(GovernanceProposal {
        proposal_id: r.try_get("proposal_id")?,
        chain_id: r.try_get("chain_id")?,
        title: r.try_get("title")?,
        description: r.try_get("description")?,
        proposal_type: r.try_get("proposal_type")?,
        status: r.try_get("status")?,
        tally: VoteTally {
            yes: r.try_get("yes_votes")?,
            abstain: r.try_get("abstain_votes")?,
            no: r.try_get("no_votes")?,
            no_with_veto: r.try_get("no_with_veto_votes")?,
        },
        submit_time: r.try_get("submit_time")?,
        deposit_end_time: r.try_get("deposit_end_time")?,
        voting_start_time: r.try_get("voting_start_time")?,
        voting_end_time: r.try_get("voting_end_time")?,
        total_deposit: r.try_get("total_deposit")?,
        proposer: r.try_get("proposer")?,
        metadata: r.try_get("metadata")?,
    })
}

#[async_trait]
impl ProposalRepository for PostgresProposalRepository {
    async fn find_proposal(&self, chain_id: &str, proposal_id: &str) -> Result<Option<GovernanceProposal>> {
        let record = sqlx::query(
            r#"
            SELECT
                proposal_id, chain_id, title, description, proposal_type, status,
                yes_votes, abstain_votes, no_votes, no_with_veto_votes,
                submit_time, deposit_end_time, voting_start_time, voting_end_time,
                total_deposit, proposer, metadata
            FROM governance_proposals
            WHERE chain_id = $1 AND proposal_id = $2
            "#,
        )
        .bind(chain_id)
        .bind(proposal_id)
        .fetch_optional(&self.pool)
        .await?;

        record.as_ref().map(proposal_from_row).transpose()
    }

    async fn insert_proposal(&self, proposal: &GovernanceProposal) -> Result<()> {
        sqlx::query(
            r#"
            INSERT INTO governance_proposals (
                proposal_id, chain_id, title, description, proposal_type, status,
                yes_votes, abstain_votes, no_votes, no_with_veto_votes,
                submit_time, deposit_end_time, voting_start_time, voting_end_time,
                total_deposit, proposer, metadata
            ) VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13, $14, $15, $16, $17)
            "#,
        )
        .bind(&proposal.proposal_id)
        .bind(&proposal.chain_id)
        .bind(proposal.title.as_deref())
        .bind(proposal.description.as_deref())
        .bind(proposal.proposal_type.as_deref())
        .bind(&proposal.status)
        .bind(&proposal.tally.yes)
        .bind(&proposal.tally.abstain)
        .bind(&proposal.tally.no)
        .bind(&proposal.tally.no_with_veto)
        .bind(proposal.submit_time)
        .bind(proposal.deposit_end_time)
        .bind(proposal.voting_start_time)
        .bind(proposal.voting_end_time)
        .bind(&proposal.total_deposit)
        .bind(proposal.proposer.as_deref())
        .bind(proposal.metadata.as_deref())
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    async fn update_proposal(&self, proposal: &GovernanceProposal) -> Result<()> {
        let result = sqlx::query(
            r#"
            UPDATE governance_proposals
            SET status = $3,
                yes_votes = $4,
                abstain_votes = $5,
                no_votes = $6,
                no_with_veto_votes = $7,
                title = $8,
                description = $9,
                metadata = $10,
                total_deposit = $11,
                deposit_end_time = COALESCE($12, deposit_end_time),
                voting_start_time = COALESCE($13, voting_start_time),
                voting_end_time = COALESCE($14, voting_end_time)
            WHERE chain_id = $1 AND proposal_id = $2
            "#,
        )
        .bind(&proposal.chain_id)
        .bind(&proposal.proposal_id)
        .bind(&proposal.status)
        .bind(&proposal.tally.yes)
        .bind(&proposal.tally.abstain)
        .bind(&proposal.tally.no)
        .bind(&proposal.tally.no_with_veto)
        .bind(proposal.title.as_deref())
        .bind(proposal.description.as_deref())
        .bind(proposal.metadata.as_deref())
        .bind(&proposal.total_deposit)
        .bind(proposal.deposit_end_time)
        .bind(proposal.voting_start_time)
        .bind(proposal.voting_end_time)
        .execute(&self.pool)
        .await?;

        if result.rows_affected() == 0 {
            bail!("proposal {} not found on chain {}", proposal.proposal_id, proposal.chain_id);
        }
        Ok(())
    }
}
