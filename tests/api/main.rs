mod health_check;
mod registration;
mod verify_account;
