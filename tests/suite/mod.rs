mod assessment;
mod mission;
mod workshop_lifecycle;
