use chrono::{DateTime, Utc};
use sea_orm::ActiveValue::Set;
use sea_orm::QueryOrder;
use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};
use strum::{Display, EnumString};

/// A geofenced zone where self check-in is allowed.
///
/// A zone is either a circle (`latitude`/`longitude` plus `radius_meters`) or
/// a polygon stored as a JSON array of `[lat, lng]` pairs in
/// `polygon_coordinates`. For polygons the `latitude`/`longitude` columns hold
/// a representative centre used for display only.
#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "attendance_locations")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i64,
    pub name: String,
    pub latitude: f64,
    pub longitude: f64,
    pub location_type: LocationType,
    pub radius_meters: Option<f64>,
    pub polygon_coordinates: Option<String>,
    pub is_active: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(
    Debug, Clone, PartialEq, EnumIter, DeriveActiveEnum, Display, EnumString, Deserialize, Serialize,
)]
#[serde(rename_all = "snake_case")]
#[sea_orm(rs_type = "String", db_type = "Enum", enum_name = "location_type")]
#[strum(serialize_all = "lowercase", ascii_case_insensitive)]
pub enum LocationType {
    #[sea_orm(string_value = "radius")]
    Radius,

    #[sea_orm(string_value = "polygon")]
    Polygon,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(has_many = "super::self_attendance::Entity")]
    SelfAttendance,
}

impl Related<super::self_attendance::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::SelfAttendance.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}

impl Model {
    pub async fn create_radius(
        db: &DatabaseConnection,
        name: &str,
        latitude: f64,
        longitude: f64,
        radius_meters: f64,
    ) -> Result<Self, DbErr> {
        if !(radius_meters > 0.0) {
            return Err(DbErr::Custom(format!(
                "radius zone requires radius_meters > 0, got {radius_meters}"
            )));
        }

        let now = Utc::now();
        ActiveModel {
            name: Set(name.to_owned()),
            latitude: Set(latitude),
            longitude: Set(longitude),
            location_type: Set(LocationType::Radius),
            radius_meters: Set(Some(radius_meters)),
            polygon_coordinates: Set(None),
            is_active: Set(true),
            created_at: Set(now),
            updated_at: Set(now),
            ..Default::default()
        }
        .insert(db)
        .await
    }

    pub async fn create_polygon(
        db: &DatabaseConnection,
        name: &str,
        latitude: f64,
        longitude: f64,
        points: &[(f64, f64)],
    ) -> Result<Self, DbErr> {
        if points.len() < 3 {
            return Err(DbErr::Custom(format!(
                "polygon zone requires at least 3 points, got {}",
                points.len()
            )));
        }

        let pairs: Vec<[f64; 2]> = points.iter().map(|&(lat, lng)| [lat, lng]).collect();
        let encoded = serde_json::to_string(&pairs)
            .map_err(|e| DbErr::Custom(format!("invalid polygon coordinates: {e}")))?;

        let now = Utc::now();
        ActiveModel {
            name: Set(name.to_owned()),
            latitude: Set(latitude),
            longitude: Set(longitude),
            location_type: Set(LocationType::Polygon),
            radius_meters: Set(None),
            polygon_coordinates: Set(Some(encoded)),
            is_active: Set(true),
            created_at: Set(now),
            updated_at: Set(now),
            ..Default::default()
        }
        .insert(db)
        .await
    }

    /// All active zones, ordered by id so that overlap resolution is stable.
    pub async fn find_active(db: &DatabaseConnection) -> Result<Vec<Self>, DbErr> {
        Entity::find()
            .filter(Column::IsActive.eq(true))
            .order_by_asc(Column::Id)
            .all(db)
            .await
    }

    pub async fn set_active(&self, db: &DatabaseConnection, active: bool) -> Result<Self, DbErr> {
        let mut active_model: ActiveModel = self.clone().into();
        active_model.is_active = Set(active);
        active_model.updated_at = Set(Utc::now());
        active_model.update(db).await
    }

    /// Decodes `polygon_coordinates` into `(lat, lng)` pairs.
    ///
    /// Returns an empty vector when no polygon is stored and an error when
    /// the stored JSON is malformed.
    pub fn polygon_points(&self) -> Result<Vec<(f64, f64)>, serde_json::Error> {
        let raw = match &self.polygon_coordinates {
            Some(raw) => raw,
            None => return Ok(Vec::new()),
        };
        let pairs: Vec<[f64; 2]> = serde_json::from_str(raw)?;
        Ok(pairs.into_iter().map(|[lat, lng]| (lat, lng)).collect())
    }
}
