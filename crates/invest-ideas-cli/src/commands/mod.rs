pub mod backtest;
pub mod history;
pub mod hospitality;
pub mod ideas;
pub mod products;
pub mod project;
pub mod real_estate;
