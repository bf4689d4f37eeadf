pub mod company;
pub mod credit;
pub mod employee;
pub mod location;
pub mod wage;
