use crate::{
    data::user::UserRepository,
    error::{pacte::PacteError, AppError},
    model::user::{LadderKind, RegisterUserParam},
};
use chrono::Utc;
use sea_orm::EntityTrait;
use test_utils::{builder::TestBuilder, factory};

mod apply_points;
mod ladder;
mod register;
mod stats;
