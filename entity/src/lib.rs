pub mod city;
pub mod picnic;
pub mod picnic_registration;
pub mod user;
