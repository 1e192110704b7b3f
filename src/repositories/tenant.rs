//! # Tenant Repository
//!
//! This module contains the repository implementation for Tenant entities.
//! Tenants are admin-provisioned and rarely mutated, so the surface here is
//! lookups plus a create used by provisioning and tests.

use std::collections::HashMap;

use crate::error::RepositoryError;
use crate::models::tenant::{
    ActiveModel as TenantActiveModel, Column as TenantColumn, Entity as Tenant,
    Model as TenantModel,
};
use chrono::Utc;
use sea_orm::{ActiveModelTrait, ColumnTrait, DatabaseConnection, EntityTrait, QueryFilter, Set};
use uuid::Uuid;

/// Request data for creating a new tenant
#[derive(Debug, Clone)]
pub struct CreateTenantRequest {
    /// Custom domain serving this tenant's directory
    pub domain: String,
    /// Display name for the tenant
    pub name: String,
    /// Display title for the directory home page
    pub title: Option<String>,
}

/// Repository for Tenant database operations
pub struct TenantRepository<'a> {
    db: &'a DatabaseConnection,
}

impl<'a> TenantRepository<'a> {
    /// Create a new TenantRepository with the given database connection
    pub fn new(db: &'a DatabaseConnection) -> Self {
        Self { db }
    }

    /// Create a new tenant
    pub async fn create_tenant(
        &self,
        request: CreateTenantRequest,
    ) -> Result<TenantModel, RepositoryError> {
        let domain = request.domain.trim().to_lowercase();
        if domain.is_empty() {
            return Err(RepositoryError::Validation(
                "Tenant domain cannot be empty".to_string(),
            ));
        }
        if request.name.trim().is_empty() {
            return Err(RepositoryError::Validation(
                "Tenant name cannot be empty".to_string(),
            ));
        }

        let tenant = TenantActiveModel {
            id: Set(Uuid::new_v4()),
            domain: Set(domain),
            name: Set(request.name),
            title: Set(request.title),
            created_at: Set(Utc::now().into()),
        };

        let result = tenant
            .insert(self.db)
            .await
            .map_err(RepositoryError::database_error)?;

        Ok(result)
    }

    /// Get tenant by ID
    pub async fn get_tenant_by_id(
        &self,
        tenant_id: Uuid,
    ) -> Result<Option<TenantModel>, RepositoryError> {
        let tenant = Tenant::find_by_id(tenant_id)
            .one(self.db)
            .await
            .map_err(RepositoryError::database_error)?;

        Ok(tenant)
    }

    /// Look up a tenant by its routing domain
    pub async fn find_by_domain(
        &self,
        domain: &str,
    ) -> Result<Option<TenantModel>, RepositoryError> {
        let tenant = Tenant::find()
            .filter(TenantColumn::Domain.eq(domain))
            .one(self.db)
            .await
            .map_err(RepositoryError::database_error)?;

        Ok(tenant)
    }

    /// List all tenants
    pub async fn list_tenants(&self) -> Result<Vec<TenantModel>, RepositoryError> {
        let tenants = Tenant::find()
            .all(self.db)
            .await
            .map_err(RepositoryError::database_error)?;

        Ok(tenants)
    }

    /// Load every tenant into a domain → id lookup map.
    ///
    /// The spreadsheet reconciler resolves the `tenantDomain` column through
    /// this map once per pull rather than querying per row.
    pub async fn domain_map(&self) -> Result<HashMap<String, Uuid>, RepositoryError> {
        let tenants = self.list_tenants().await?;
        Ok(tenants.into_iter().map(|t| (t.domain, t.id)).collect())
    }

    /// Load every tenant into an id → domain lookup map (used when flattening
    /// ads for the spreadsheet push).
    pub async fn id_to_domain_map(&self) -> Result<HashMap<Uuid, String>, RepositoryError> {
        let tenants = self.list_tenants().await?;
        Ok(tenants.into_iter().map(|t| (t.id, t.domain)).collect())
    }
}
