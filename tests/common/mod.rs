#![allow(dead_code)]

use diesel::RunQueryDsl;
use pushkind_dispatch::db::{DbPool, establish_connection_pool, run_migrations};
use pushkind_dispatch::models::dispatch_plan::NewDispatchPlan;
use pushkind_dispatch::models::storage::{NewRollConfirmation, NewStorageCapture};
use pushkind_dispatch::schema::{dispatch_plans, roll_confirmations, storage_captures};
use tempfile::TempDir;

/// Migrated SQLite database living in a temporary directory.
pub struct TestDb {
    _dir: TempDir,
    pool: DbPool,
}

impl TestDb {
    pub fn new(name: &str) -> Self {
        let dir = tempfile::tempdir().expect("create temp dir");
        let path = dir.path().join(name);
        let pool = establish_connection_pool(path.to_str().expect("utf-8 path"))
            .expect("create pool");
        run_migrations(&pool).expect("run migrations");
        Self { _dir: dir, pool }
    }

    pub fn pool(&self) -> DbPool {
        self.pool.clone()
    }

    pub fn add_lot(&self, order: &str, lot_no: &str, sequence_no: i32, rolls: i32) {
        let mut conn = self.pool.get().unwrap();
        diesel::insert_into(dispatch_plans::table)
            .values(&NewDispatchPlan {
                dispatch_order_id: order,
                lot_no,
                tape: "Single jersey",
                sequence_no,
                total_ready_rolls: rolls,
                total_dispatched_rolls: rolls,
                is_fully_dispatched: false,
            })
            .execute(&mut conn)
            .unwrap();
    }

    pub fn add_stored_roll(&self, lot_no: &str, roll_no: &str, order: Option<&str>) {
        self.add_finished_roll(lot_no, roll_no, None, order);
    }

    pub fn add_finished_roll(
        &self,
        lot_no: &str,
        roll_no: &str,
        fg_roll_no: Option<&str>,
        order: Option<&str>,
    ) {
        let mut conn = self.pool.get().unwrap();
        diesel::insert_into(storage_captures::table)
            .values(&NewStorageCapture {
                lot_no,
                machine_name: "M1",
                roll_no,
                fg_roll_no,
                dispatch_order_id: order,
                is_dispatched: false,
            })
            .execute(&mut conn)
            .unwrap();
    }

    pub fn add_weight(&self, lot_no: &str, roll_no: &str, gross: f64, net: f64) {
        let mut conn = self.pool.get().unwrap();
        diesel::insert_into(roll_confirmations::table)
            .values(&NewRollConfirmation {
                lot_no,
                machine_name: "M1",
                roll_no,
                gross_weight: gross,
                net_weight: net,
            })
            .execute(&mut conn)
            .unwrap();
    }
}
