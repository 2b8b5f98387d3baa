pub mod a001_sales_commission;
pub mod a002_commission_check;
pub mod a003_salesperson;
pub mod a004_adjuster;
pub mod a005_sales_goal;
pub mod a006_sales_plan;
pub mod a007_claim;
pub mod common;
