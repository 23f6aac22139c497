//! Prompt templates for the guessing games and the illustration requests

use super::GameKind;

const PLACE_FORMAT: &str =
    r#"entered with the administrative division and country, separated by commas (e.g., "Dallas, Texas, United States")"#;

fn preamble(kind: GameKind) -> String {
    match kind {
        GameKind::Person => "Based on the following information, guess who the famous person is. Source biographical information from Wikipedia.".to_string(),
        GameKind::Invention => "Based on the following information, guess what the invention is. Source information from Wikipedia.".to_string(),
        GameKind::Event => "You are an expert at identifying historical events based on descriptions. Based on the following information, guess which event the user is describing.".to_string(),
        other => format!(
            "You are an expert at identifying {} based on descriptions. Based on the following information, guess which {} the user is describing.",
            other.plural(),
            other.noun()
        ),
    }
}

fn field_list(kind: GameKind) -> String {
    match kind {
        GameKind::Person => format!(
            r#"- name: The person's full name
- date_of_birth: The person's date of birth, or null if unknown
- place_of_birth: The person's place of birth, {place}, or null if unknown
- place_of_residence: The person's place of residence, {place}, or null if dead or unknown
- date_of_death: The person's date of death, or null if still alive
- place_of_death: The person's place of death, {place}, or null if still alive
- place_of_burial: The person's place of burial, {place}, or null if still alive or unknown
- parents: An array of strings with parent names, or empty array [] if unknown
- siblings: An array of strings with sibling names, or empty array [] if unknown
- spouse: An array of strings with spouse names, or empty array [] if unknown
- children: An array of strings with children names, or empty array [] if unknown
- wikipedia_url: Wikipedia URL for this person, or null if not found
- reasoning: Brief explanation of why you think this is the correct person based on the information provided
- overview: A brief overview of the person's life in 50 to 75 words"#,
            place = PLACE_FORMAT
        ),
        GameKind::City => r#"- name: The city name
- county: County (if applicable, otherwise null)
- parish: Parish (if applicable, otherwise null)
- borough: Borough (if applicable, otherwise null)
- state: State (if applicable, otherwise null)
- prefecture: Prefecture (if applicable, otherwise null)
- province: Province (if applicable, otherwise null)
- department: Department (if applicable, otherwise null)
- region: Region (if applicable, otherwise null)
- territory: Territory (if applicable, otherwise null)
- canton: Canton (if applicable, otherwise null)
- voivodeship: Voivodeship (if applicable, otherwise null)
- autonomous_community: Autonomous community (if applicable, otherwise null)
- other_administrative_division: Other administrative division (if applicable, otherwise null)
- country: The country where the city is located
- population: The population of the city (if known, otherwise null)
- year_founded: Year the city was founded (if known, otherwise null)
- wikipedia_url: Wikipedia URL for the city (if available, otherwise null)
- image: URL to an image of the city (if available, otherwise null)
- reasoning: Your reasoning for why you think this is the correct city
- overview: A concise 50-75 word overview of the city's history, significance, and notable features"#
            .to_string(),
        GameKind::Business => format!(
            r#"- name: The business name
- type: The business type (public, private, subsidiary, etc.)
- stock_exchange: The stock exchange where the company is listed (if public, otherwise "N/A")
- ticker: The stock ticker symbol (if public, otherwise "N/A")
- industry: An array of industries the business operates in
- predecessors: An array of predecessor companies (if any, otherwise empty array)
- previous_names: An array of previous company names (if any, otherwise empty array)
- city_founded: The city where the company was founded, {place}
- year_founded: The year the company was founded
- founders: An array of founder names (if known, otherwise empty array)
- current_headquarters: The current headquarters location, {place}
- areas_served: An array of geographic areas where the company operates
- chairman: The current chairman (if known, otherwise null)
- ceo: The current CEO (if known, otherwise null)
- products: An array of main products (if any, otherwise empty array)
- services: An array of main services (if any, otherwise empty array)
- subsidiaries: An array of subsidiary companies (if any, otherwise empty array)
- revenue: Annual revenue (if known, otherwise null)
- operating_income: Annual operating income (if known, otherwise null)
- net_income: Annual net income (if known, otherwise null)
- total_assets: Total assets (if known, otherwise null)
- total_equity: Total equity (if known, otherwise null)
- owner: The owner of the company (if known, otherwise null)
- owner_equity_percentage: The owner's equity percentage (if owner known, otherwise null)
- number_of_employees: Number of employees (if known, otherwise null)
- parent: The parent company (if any, otherwise null)
- website: The company's website URL (if known, otherwise null)
- wikipedia_url: Wikipedia URL for the business (if available, otherwise null)
- overview: A concise 50-75 word overview of the business's history, significance, and notable features
- reasoning: Your reasoning for why you think this is the correct business"#,
            place = PLACE_FORMAT
        ),
        GameKind::Invention => format!(
            r#"- name: The invention's name
- year_invented: The year the invention was invented, or null if unknown
- place_invented: The place where the invention was invented, or null if unknown
- inventors: An array of strings with inventor names, or empty array [] if unknown
- materials_used: An array of strings with materials used in the invention, or empty array [] if unknown
- previous_inventions: An array of strings with names of previous inventions it relied on, or empty array [] if unknown
- later_inventions: An array of strings with names of later inventions it enabled, or empty array [] if unknown
- consumer_uses: An array of strings with consumer uses of the invention, or empty array [] if unknown
- commercial_uses: An array of strings with commercial uses of the invention, or empty array [] if unknown
- institutional_uses: An array of strings with institutional (government, military, education, scientific, nonprofit, etc.) uses of the invention, or empty array [] if unknown
- businesses: An array of strings with names of businesses that produce this invention, or empty array [] if unknown
- design_hubs: An array of cities where the invention is or was historically designed, {place}, or empty array [] if unknown
- manufacturing_hubs: An array of cities where the invention is or was historically manufactured, {place}, or empty array [] if unknown
- historical_events: An array of strings with names of historical events where this invention was used, or empty array [] if unknown
- wikipedia_url: Wikipedia URL for this invention, or null if not found
- reasoning: Brief explanation of why you think this is the correct invention based on the information provided
- overview: A brief overview of the invention in 50 to 75 words
- city: A modern-day city that is located near the geographic center of the invention (if known, otherwise null), {place}"#,
            place = PLACE_FORMAT
        ),
        GameKind::Movie => r#"- name: The movie title
- directed_by: An array of director names
- screenplay_by: An array of screenwriter names
- story_by: An array of story writer names (if different from screenplay, otherwise empty array)
- based_on: What the movie is based on (book, true story, original script, etc.)
- produced_by: An array of producer names
- starring: An array of main cast member names
- cinematography: An array of cinematographer names
- edited_by: An array of editor names
- music_by: An array of composer names
- production_company: An array of production company names
- distributed_by: An array of distributor names
- release_dates: An object with country as key and release date as value (e.g., {"United States": "2023-07-21", "United Kingdom": "2023-07-28"})
- running_time: The movie's running time in minutes
- country: An array of countries where the movie was produced
- language: An array of languages the movie is in
- budget: The movie's budget (if known, otherwise null)
- box_office: The movie's box office gross (if known, otherwise null)
- wikipedia_url: Wikipedia URL for the movie (if available, otherwise null)
- reasoning: Your reasoning for why you think this is the correct movie
- overview: A concise 50-75 word overview of the movie's plot, significance, and notable features"#
            .to_string(),
        GameKind::TvShow => format!(
            r#"- name: The TV show title
- genre: An array of the show's genres
- imdb_rating: The show's IMDB rating (if known, otherwise null)
- rotten_tomatoes_rating: The show's Rotten Tomatoes rating (if known, otherwise null)
- tv_parental_guidelines_rating: The show's TV Parental Guidelines rating (TV-Y, TV-Y7, TV-G, TV-PG, TV-14, TV-MA, Not Rated)
- created_by: An array of creator names
- written_by: An array of writer names
- starring: An array of main cast member names
- composers: An array of composer names
- country_of_origin: An array of countries where the show was produced
- original_language: An array of languages the show is originally in
- number_of_seasons: The number of seasons
- number_of_episodes: The total number of episodes
- executive_producers: An array of executive producer names
- producers: An array of producer names
- cinematography: An array of cinematographer names
- editors: An array of editor names
- running_time: The average episode running time in minutes
- production_companies: An array of production company names
- network: An array of networks/channels that aired the show
- release_date: The original air date or premiere date
- imdb_url: IMDB URL for the show (if available, otherwise null)
- rotten_tomatoes_url: Rotten Tomatoes URL for the show (if available, otherwise null)
- wikipedia_url: Wikipedia URL for the show (if available, otherwise null)
- people: An array of real-world people who appear as characters in the show, or empty array [] if unknown
- cities: An array of real-world cities where the show takes place, {place}, or empty array [] if unknown
- events: An array of real-world events where the show takes place, or empty array [] if unknown
- reasoning: Your reasoning for why you think this is the correct TV show
- overview: A concise 50-75 word overview of the show's plot, significance, and notable features"#,
            place = PLACE_FORMAT
        ),
        GameKind::Event => format!(
            r#"- name: The event name
- start: Start date of the event (if known, otherwise null)
- end: End date of the event (if known, otherwise null)
- location: The primary location where the event took place (if known, otherwise null)
- key_cities: An array of key cities involved in the event (if known, otherwise empty array), {place}
- key_figures: An array of key figures involved in the event (if known, otherwise empty array)
- key_technologies: An array of key technologies used in the event (if known, otherwise empty array)
- causes: The main causes or triggers of the event (if known, otherwise null), answered as a complete sentence
- key_developments: Key developments or phases of the event (if known, otherwise null), answered as a complete sentence
- results: The main results or outcomes of the event (if known, otherwise null), answered as a complete sentence
- wikipedia_url: Wikipedia URL for the event (if available, otherwise null)
- reasoning: Your reasoning for why you think this is the correct event
- overview: A concise 50-75 word overview of the event's significance and key details
- city: A modern-day city that is located near the geographic center of the event (if known, otherwise null), {place}"#,
            place = PLACE_FORMAT
        ),
    }
}

/// The "don't repeat yourself" line; empty when nothing has been rejected.
pub fn exclusion_text(kind: GameKind, exclusions: &[String]) -> String {
    if exclusions.is_empty() {
        return String::new();
    }
    format!(
        "\n\nIMPORTANT: Do NOT guess any of these {} (they have already been marked as incorrect): {}",
        kind.plural(),
        exclusions.join(", ")
    )
}

pub fn guess_prompt(kind: GameKind, context: &str, exclusions: &[String]) -> String {
    format!(
        r#"{preamble}

Information: {context}{exclusion}

Please respond with a JSON object containing the following fields:
{fields}

If you're not sure, make your best guess based on the information provided and explain your reasoning.
Make sure to return ONLY valid JSON. Do not include any text before or after the JSON object."#,
        preamble = preamble(kind),
        context = context,
        exclusion = exclusion_text(kind, exclusions),
        fields = field_list(kind),
    )
}

/// Illustration request for games that show a generated picture of the guess.
pub fn illustration_prompt(kind: GameKind, name: &str) -> String {
    match kind {
        GameKind::Invention => format!(
            "Create a technical illustration or artistic representation of the invention: {}. The image should be technically accurate, visually compelling, and capture the essence of this important invention. Make it suitable for educational purposes.",
            name
        ),
        GameKind::Event => format!(
            "Create a historical illustration or artistic representation of the event: {}. The image should be historically accurate, visually compelling, and capture the essence of this significant historical event. Make it suitable for educational purposes.",
            name
        ),
        other => format!(
            "Create an artistic representation of the {}: {}. Make it suitable for educational purposes.",
            other.noun(),
            name
        ),
    }
}

pub fn odd_situation_prompt(person: &str, outfit: &str, scene: &str) -> String {
    format!(
        "A famous person {} wearing {} {}. The image should be clear and recognizable, showing the person in this unusual situation. Generate a high-quality, realistic image of this scenario. Make sure the person is clearly recognizable and the situation is visually interesting.",
        person, outfit, scene
    )
}
