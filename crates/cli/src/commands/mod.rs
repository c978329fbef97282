pub mod doctor;
pub mod instructor;
pub mod onboard;
pub mod run;
